use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::api::{ApiKey, ErrorCode, Request, RequiredAcks, Response};
use crate::error::Error;
use crate::wire::{self, Wire, MAX_SEQUENCE_LENGTH};
use crate::Result;


/// Produce リクエストでブローカーがレプリカの確認を待つ最大時間 (ミリ秒) のデフォルト値です。
pub const DEFAULT_TIMEOUT: i32 = 1500;

/// エンコード済みのログレコードの集合です。レコード内部のレイアウトはこのモジュールでは解釈せず、バイト長と
/// バイト列そのものだけを扱います。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSet {
  bytes: Vec<u8>,
}

impl MessageSet {
  /// エンコード済みのバイト列からメッセージセットを構築します。長さは 4 バイトのサイズフィールドで表現できる
  /// 範囲に収まっている必要があります。
  pub fn new(bytes: Vec<u8>) -> Result<Self> {
    if bytes.len() > MAX_SEQUENCE_LENGTH {
      Err(Error::PayloadTooLarge { length: bytes.len(), maximum: MAX_SEQUENCE_LENGTH })
    } else {
      Ok(MessageSet { bytes })
    }
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }

  pub fn into_bytes(self) -> Vec<u8> {
    self.bytes
  }

  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }

  pub fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    buf.write_all(&self.bytes).map_err(Error::from)
  }

  /// `buf` からちょうど `size` バイトをメッセージセットとして読み込みます。
  pub fn read_from<R: Read>(buf: &mut R, size: usize) -> Result<Self> {
    let mut bytes = Vec::new();
    buf.by_ref().take(size as u64).read_to_end(&mut bytes)?;
    if bytes.len() < size {
      Err(Error::Truncated)
    } else {
      Ok(MessageSet { bytes })
    }
  }
}

/// 1 つのパーティションに送信するメッセージセットです。メッセージセットのバイト長を示すサイズフィールドは構築時に
/// 確定し、以後変更されることはありません。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionedMessageSet {
  partition: i32,
  message_set_size: i32,
  message_set: MessageSet,
}

impl PartitionedMessageSet {
  pub fn new(partition: i32, message_set: MessageSet) -> Self {
    let message_set_size = message_set.len() as i32;
    PartitionedMessageSet { partition, message_set_size, message_set }
  }

  pub fn partition(&self) -> i32 {
    self.partition
  }

  pub fn message_set_size(&self) -> i32 {
    self.message_set_size
  }

  pub fn message_set(&self) -> &MessageSet {
    &self.message_set
  }
}

impl Wire for PartitionedMessageSet {
  fn length(&self) -> usize {
    self.partition.length() + self.message_set_size.length() + self.message_set.len()
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    debug_assert_eq!(self.message_set_size as usize, self.message_set.len());
    self.partition.write_to(buf)?;
    self.message_set_size.write_to(buf)?;
    self.message_set.write_to(buf)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    let partition = i32::read_from(buf)?;
    let message_set_size = i32::read_from(buf)?;
    if message_set_size < 0 {
      return Err(Error::IllegalLength { length: message_set_size as i64 });
    }
    let message_set = MessageSet::read_from(buf, message_set_size as usize)?;
    Ok(PartitionedMessageSet { partition, message_set_size, message_set })
  }
}

/// 1 つのトピックに送信するパーティションごとのメッセージセットです。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicalMessageSet {
  topic: String,
  partitions: Vec<PartitionedMessageSet>,
}

impl TopicalMessageSet {
  /// パーティションは指定された順序のままシリアライズされます。
  pub fn new(topic: String, partitions: Vec<PartitionedMessageSet>) -> Result<Self> {
    wire::verify_string(&topic)?;
    Ok(TopicalMessageSet { topic, partitions })
  }

  pub fn topic(&self) -> &str {
    &self.topic
  }

  pub fn partitions(&self) -> &[PartitionedMessageSet] {
    &self.partitions
  }
}

impl Wire for TopicalMessageSet {
  fn length(&self) -> usize {
    self.topic.length() + self.partitions.length()
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    self.topic.write_to(buf)?;
    self.partitions.write_to(buf)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    Ok(TopicalMessageSet { topic: String::read_from(buf)?, partitions: Vec::read_from(buf)? })
  }
}

/// Produce リクエスト (API キー 0、バージョン 0) のメッセージ本体です。
///
/// ```text
/// acks:i16 timeout:i32 [topic:string [partition:i32 message_set_size:i32 message_set]]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProduceRequest {
  acks: RequiredAcks,
  timeout: i32,
  topics: Vec<TopicalMessageSet>,
}

impl ProduceRequest {
  pub fn builder() -> ProduceRequestBuilder {
    ProduceRequestBuilder::default()
  }

  /// トピック名 → パーティション → メッセージセットの対応からデフォルトの設定でリクエストを構築します。
  /// 入力の列挙順序にかかわらず、トピックは名前の辞書順、パーティションは番号の昇順に並べられます。
  pub fn new<T, P>(values: impl IntoIterator<Item = (T, P)>) -> Result<Self>
  where
    T: Into<String>,
    P: IntoIterator<Item = (i32, MessageSet)>,
  {
    let mut builder = ProduceRequest::builder();
    for (topic, partitions) in values {
      let topic = topic.into();
      for (partition, message_set) in partitions {
        builder = builder.message_set(topic.clone(), partition, message_set);
      }
    }
    builder.build()
  }

  /// 既に並び順の決まったトピックから直接リクエストを構築します。
  pub fn with_topics(acks: RequiredAcks, timeout: i32, topics: Vec<TopicalMessageSet>) -> Self {
    ProduceRequest { acks, timeout, topics }
  }

  pub fn acks(&self) -> RequiredAcks {
    self.acks
  }

  pub fn timeout(&self) -> i32 {
    self.timeout
  }

  pub fn topics(&self) -> &[TopicalMessageSet] {
    &self.topics
  }

  /// ブローカーがこのリクエストに対してレスポンスを返す場合 `true` を返します。`RequiredAcks::NoResponse` を
  /// 指定したリクエストにはレスポンスが返されません。
  pub fn expects_response(&self) -> bool {
    self.acks != RequiredAcks::NoResponse
  }
}

impl Wire for ProduceRequest {
  fn length(&self) -> usize {
    self.acks.length() + self.timeout.length() + self.topics.length()
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    self.acks.write_to(buf)?;
    self.timeout.write_to(buf)?;
    self.topics.write_to(buf)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    Ok(ProduceRequest {
      acks: RequiredAcks::read_from(buf)?,
      timeout: i32::read_from(buf)?,
      topics: Vec::read_from(buf)?,
    })
  }
}

impl Request for ProduceRequest {
  const API_KEY: ApiKey = ApiKey::Produce;
  const API_VERSION: i16 = 0;
  type Response = ProduceResponse;
}

/// `ProduceRequest` を組み立てるためのビルダーです。`build()` によって変更不可能なリクエストが確定します。
#[derive(Debug)]
pub struct ProduceRequestBuilder {
  acks: RequiredAcks,
  timeout: i32,
  topics: BTreeMap<String, BTreeMap<i32, MessageSet>>,
}

impl Default for ProduceRequestBuilder {
  fn default() -> Self {
    ProduceRequestBuilder { acks: RequiredAcks::default(), timeout: DEFAULT_TIMEOUT, topics: BTreeMap::new() }
  }
}

impl ProduceRequestBuilder {
  pub fn acks(mut self, acks: RequiredAcks) -> Self {
    self.acks = acks;
    self
  }

  /// ブローカーがレプリカの確認を待つ最大時間をミリ秒で指定します。
  pub fn timeout(mut self, timeout: i32) -> Self {
    self.timeout = timeout;
    self
  }

  /// 指定されたトピックのパーティションに送信するメッセージセットを追加します。同じパーティションに対して
  /// 複数回呼び出した場合は最後に指定したメッセージセットが使用されます。
  pub fn message_set(mut self, topic: impl Into<String>, partition: i32, message_set: MessageSet) -> Self {
    let topic = topic.into();
    let partitions = self.topics.entry(topic.clone()).or_insert_with(BTreeMap::new);
    if partitions.insert(partition, message_set).is_some() {
      log::warn!("message set for {}:{} was replaced", topic, partition);
    }
    self
  }

  pub fn build(self) -> Result<ProduceRequest> {
    let mut topics = Vec::with_capacity(self.topics.len());
    for (topic, partitions) in self.topics {
      let partitions = partitions
        .into_iter()
        .map(|(partition, message_set)| PartitionedMessageSet::new(partition, message_set))
        .collect();
      topics.push(TopicalMessageSet::new(topic, partitions)?);
    }
    Ok(ProduceRequest { acks: self.acks, timeout: self.timeout, topics })
  }
}

/// Produce レスポンス (バージョン 0) のメッセージ本体です。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProduceResponse {
  topics: Vec<TopicalResponse>,
}

impl ProduceResponse {
  pub fn new(topics: Vec<TopicalResponse>) -> Self {
    ProduceResponse { topics }
  }

  pub fn topics(&self) -> &[TopicalResponse] {
    &self.topics
  }
}

impl Wire for ProduceResponse {
  fn length(&self) -> usize {
    self.topics.length()
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    self.topics.write_to(buf)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    Ok(ProduceResponse { topics: Vec::read_from(buf)? })
  }
}

impl Response for ProduceResponse {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicalResponse {
  topic: String,
  partitions: Vec<PartitionedResponse>,
}

impl TopicalResponse {
  pub fn new(topic: String, partitions: Vec<PartitionedResponse>) -> Self {
    TopicalResponse { topic, partitions }
  }

  pub fn topic(&self) -> &str {
    &self.topic
  }

  pub fn partitions(&self) -> &[PartitionedResponse] {
    &self.partitions
  }
}

impl Wire for TopicalResponse {
  fn length(&self) -> usize {
    self.topic.length() + self.partitions.length()
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    self.topic.write_to(buf)?;
    self.partitions.write_to(buf)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    Ok(TopicalResponse { topic: String::read_from(buf)?, partitions: Vec::read_from(buf)? })
  }
}

/// パーティションごとの書き込み結果です。`offset` は追加されたメッセージセットの先頭に割り当てられたオフセットです。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PartitionedResponse {
  partition: i32,
  error: ErrorCode,
  offset: i64,
}

impl PartitionedResponse {
  pub fn new(partition: i32, error: ErrorCode, offset: i64) -> Self {
    PartitionedResponse { partition, error, offset }
  }

  pub fn partition(&self) -> i32 {
    self.partition
  }

  pub fn error(&self) -> ErrorCode {
    self.error
  }

  pub fn offset(&self) -> i64 {
    self.offset
  }
}

impl Wire for PartitionedResponse {
  fn length(&self) -> usize {
    self.partition.length() + self.error.length() + self.offset.length()
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    self.partition.write_to(buf)?;
    self.error.write_to(buf)?;
    self.offset.write_to(buf)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    Ok(PartitionedResponse {
      partition: i32::read_from(buf)?,
      error: ErrorCode::read_from(buf)?,
      offset: i64::read_from(buf)?,
    })
  }
}
