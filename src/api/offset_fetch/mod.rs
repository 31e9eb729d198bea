use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::api::{ApiKey, ErrorCode, Request, Response};
use crate::wire::{self, Wire};
use crate::Result;


/// コミット済みのオフセットが存在しないことを示すオフセット値です。
pub const NO_COMMITTED_OFFSET: i64 = -1;

/// OffsetFetch リクエスト (API キー 9、バージョン 1) のメッセージ本体です。コンシューマーグループがコミットした
/// オフセットを問い合わせます。
///
/// ```text
/// group_id:string [topic:string [partition:i32]]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetFetchRequest {
  consumer_group: String,
  topics: Vec<OffsetFetchTopic>,
}

impl OffsetFetchRequest {
  /// トピック名 → パーティション一覧の対応からリクエストを構築します。トピックは名前の辞書順に並べられ、
  /// 各トピックのパーティションは指定された順序のまま送信されます。同じトピックが複数回現れた場合は
  /// パーティション一覧を連結します。
  pub fn new<T, P>(consumer_group: impl Into<String>, topics: impl IntoIterator<Item = (T, P)>) -> Result<Self>
  where
    T: Into<String>,
    P: IntoIterator<Item = i32>,
  {
    let mut sorted = BTreeMap::<String, Vec<i32>>::new();
    for (topic, partitions) in topics {
      sorted.entry(topic.into()).or_insert_with(Vec::new).extend(partitions);
    }
    let topics = sorted
      .into_iter()
      .map(|(topic, partitions)| OffsetFetchTopic::new(topic, partitions))
      .collect::<Result<Vec<_>>>()?;
    OffsetFetchRequest::with_topics(consumer_group, topics)
  }

  /// 既に並び順の決まったトピックから直接リクエストを構築します。
  pub fn with_topics(consumer_group: impl Into<String>, topics: Vec<OffsetFetchTopic>) -> Result<Self> {
    let consumer_group = consumer_group.into();
    wire::verify_string(&consumer_group)?;
    Ok(OffsetFetchRequest { consumer_group, topics })
  }

  pub fn consumer_group(&self) -> &str {
    &self.consumer_group
  }

  pub fn topics(&self) -> &[OffsetFetchTopic] {
    &self.topics
  }
}

impl Wire for OffsetFetchRequest {
  fn length(&self) -> usize {
    self.consumer_group.length() + self.topics.length()
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    self.consumer_group.write_to(buf)?;
    self.topics.write_to(buf)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    Ok(OffsetFetchRequest { consumer_group: String::read_from(buf)?, topics: Vec::read_from(buf)? })
  }
}

impl Request for OffsetFetchRequest {
  const API_KEY: ApiKey = ApiKey::OffsetFetch;
  const API_VERSION: i16 = 1;
  type Response = OffsetFetchResponse;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetFetchTopic {
  topic: String,
  partitions: Vec<i32>,
}

impl OffsetFetchTopic {
  pub fn new(topic: String, partitions: Vec<i32>) -> Result<Self> {
    wire::verify_string(&topic)?;
    Ok(OffsetFetchTopic { topic, partitions })
  }

  pub fn topic(&self) -> &str {
    &self.topic
  }

  pub fn partitions(&self) -> &[i32] {
    &self.partitions
  }
}

impl Wire for OffsetFetchTopic {
  fn length(&self) -> usize {
    self.topic.length() + self.partitions.length()
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    self.topic.write_to(buf)?;
    self.partitions.write_to(buf)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    Ok(OffsetFetchTopic { topic: String::read_from(buf)?, partitions: Vec::read_from(buf)? })
  }
}

/// OffsetFetch レスポンス (バージョン 1) のメッセージ本体です。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetFetchResponse {
  topics: Vec<OffsetFetchTopicResponse>,
}

impl OffsetFetchResponse {
  pub fn new(topics: Vec<OffsetFetchTopicResponse>) -> Self {
    OffsetFetchResponse { topics }
  }

  pub fn topics(&self) -> &[OffsetFetchTopicResponse] {
    &self.topics
  }
}

impl Wire for OffsetFetchResponse {
  fn length(&self) -> usize {
    self.topics.length()
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    self.topics.write_to(buf)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    Ok(OffsetFetchResponse { topics: Vec::read_from(buf)? })
  }
}

impl Response for OffsetFetchResponse {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetFetchTopicResponse {
  topic: String,
  partitions: Vec<OffsetFetchPartitionOffset>,
}

impl OffsetFetchTopicResponse {
  pub fn new(topic: String, partitions: Vec<OffsetFetchPartitionOffset>) -> Self {
    OffsetFetchTopicResponse { topic, partitions }
  }

  pub fn topic(&self) -> &str {
    &self.topic
  }

  pub fn partitions(&self) -> &[OffsetFetchPartitionOffset] {
    &self.partitions
  }
}

impl Wire for OffsetFetchTopicResponse {
  fn length(&self) -> usize {
    self.topic.length() + self.partitions.length()
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    self.topic.write_to(buf)?;
    self.partitions.write_to(buf)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    Ok(OffsetFetchTopicResponse { topic: String::read_from(buf)?, partitions: Vec::read_from(buf)? })
  }
}

/// パーティションごとのコミット済みオフセットです。
///
/// ブローカーはコミットされたオフセットが存在しない場合にオフセット -1 を返し、そのとき同じレコードのエラー
/// コードにはコミットが存在しないことを示す値が入っていることがあります。このレコードは -1 をオフセット 0、
/// エラーなしとして公開します。ワイヤ上の値は `raw_offset()` と `raw_error_code()` で参照でき、
/// 再シリアライズ時にはそのまま出力されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetFetchPartitionOffset {
  partition: i32,
  offset: i64,
  metadata: Option<String>,
  error: ErrorCode,
}

impl OffsetFetchPartitionOffset {
  pub fn new(partition: i32, offset: i64, metadata: Option<String>, error: ErrorCode) -> Self {
    OffsetFetchPartitionOffset { partition, offset, metadata, error }
  }

  pub fn partition(&self) -> i32 {
    self.partition
  }

  /// コミット済みのオフセットを参照します。コミットが存在しない場合は 0 を返します。
  pub fn offset(&self) -> i64 {
    if self.is_committed() {
      self.offset
    } else {
      0
    }
  }

  /// このパーティションに対する問い合わせのエラーを参照します。コミットが存在しない場合は、ワイヤ上のエラー
  /// コードにかかわらず `ErrorCode::NoError` を返します。
  pub fn error(&self) -> ErrorCode {
    if self.is_committed() {
      self.error
    } else {
      ErrorCode::NoError
    }
  }

  /// コミット時に付加されたメタデータを参照します。null の場合は空文字列を返します。
  pub fn metadata(&self) -> &str {
    self.metadata.as_deref().unwrap_or("")
  }

  /// このパーティションにコミット済みのオフセットが存在する場合 `true` を返します。
  pub fn is_committed(&self) -> bool {
    self.offset != NO_COMMITTED_OFFSET
  }

  pub fn raw_offset(&self) -> i64 {
    self.offset
  }

  pub fn raw_error_code(&self) -> ErrorCode {
    self.error
  }

  pub fn raw_metadata(&self) -> Option<&str> {
    self.metadata.as_deref()
  }
}

impl Wire for OffsetFetchPartitionOffset {
  fn length(&self) -> usize {
    self.partition.length() + self.offset.length() + self.metadata.length() + self.error.length()
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    self.partition.write_to(buf)?;
    self.offset.write_to(buf)?;
    self.metadata.write_to(buf)?;
    self.error.write_to(buf)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    let partition = i32::read_from(buf)?;
    let offset = i64::read_from(buf)?;
    let metadata = Option::<String>::read_from(buf)?;
    let error = ErrorCode::read_from(buf)?;
    if offset == NO_COMMITTED_OFFSET {
      log::debug!("no committed offset for partition {} (raw error: {:?})", partition, error);
    }
    Ok(OffsetFetchPartitionOffset { partition, offset, metadata, error })
  }
}
