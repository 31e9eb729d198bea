use std::convert::TryFrom;
use std::hash::{Hash, Hasher};
use std::io::{Read, Write};

use crate::error::Error;
use crate::wire::{self, Wire};
use crate::Result;

pub use error_code::ErrorCode;

pub mod error_code;
pub mod offset_fetch;
pub mod produce;

/// リクエストの種類を識別する API キーです。ワイヤ上では 2 バイト整数として表現されます。
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ApiKey {
  Produce = 0,
  Fetch = 1,
  ListOffsets = 2,
  Metadata = 3,
  LeaderAndIsr = 4,
  StopReplica = 5,
  UpdateMetadata = 6,
  ControlledShutdown = 7,
  OffsetCommit = 8,
  OffsetFetch = 9,
  FindCoordinator = 10,
  JoinGroup = 11,
  Heartbeat = 12,
  LeaveGroup = 13,
  SyncGroup = 14,
  DescribeGroups = 15,
  ListGroups = 16,
}

impl ApiKey {
  pub fn as_i16(self) -> i16 {
    self as i16
  }
}

impl TryFrom<i16> for ApiKey {
  type Error = Error;

  fn try_from(value: i16) -> Result<Self> {
    let key = match value {
      0 => ApiKey::Produce,
      1 => ApiKey::Fetch,
      2 => ApiKey::ListOffsets,
      3 => ApiKey::Metadata,
      4 => ApiKey::LeaderAndIsr,
      5 => ApiKey::StopReplica,
      6 => ApiKey::UpdateMetadata,
      7 => ApiKey::ControlledShutdown,
      8 => ApiKey::OffsetCommit,
      9 => ApiKey::OffsetFetch,
      10 => ApiKey::FindCoordinator,
      11 => ApiKey::JoinGroup,
      12 => ApiKey::Heartbeat,
      13 => ApiKey::LeaveGroup,
      14 => ApiKey::SyncGroup,
      15 => ApiKey::DescribeGroups,
      16 => ApiKey::ListGroups,
      unexpected => return Err(Error::IllegalApiKey { value: unexpected }),
    };
    Ok(key)
  }
}

/// ブローカーへ送信するリクエストのメッセージ本体です。API キーとバージョンは型ごとに固定されており、実行時に
/// 選択されることはありません。
///
/// ここで生成されるのはメッセージ本体のみです。サイズプレフィクス、相関 ID、クライアント ID などのヘッダは
/// ネットワーク層が付与します。
pub trait Request: Wire {
  /// このリクエストの API キー。
  const API_KEY: ApiKey;
  /// このリクエストのレイアウトを規定するプロトコルバージョン。
  const API_VERSION: i16;
  /// このリクエストに対してブローカーが返すレスポンスの型。
  type Response: Response;

  /// メッセージ本体をシリアライズします。
  fn to_bytes(&self) -> Result<Vec<u8>> {
    let bytes = wire::encode(self)?;
    log::trace!("encoded {:?} v{} request: {} bytes", Self::API_KEY, Self::API_VERSION, bytes.len());
    Ok(bytes)
  }
}

/// ブローカーから受信したレスポンスのメッセージ本体です。
pub trait Response: Wire {
  /// 受信したメッセージ本体からレスポンスを復元します。`bytes` はちょうどこのレスポンスの本体でなければなりません。
  /// デコードした文字列やバイト列はコピーされるため、呼び出し後に `bytes` を再利用できます。
  fn from_bytes(bytes: &[u8]) -> Result<Self> {
    let response = wire::decode(bytes)?;
    log::trace!("decoded a response of {} bytes", bytes.len());
    Ok(response)
  }
}

/// Produce リクエストでブローカーに要求する書き込み確認のレベルです。比較とハッシュはワイヤ上の値で行われるため、
/// `Custom(1)` は `Leader` と等しく扱われます。
#[derive(Debug, Copy, Clone)]
pub enum RequiredAcks {
  /// ブローカーはレスポンスを返しません。
  NoResponse,
  /// リーダーがローカルログへ書き込んだ時点で応答します。
  Leader,
  /// 全ての同期レプリカがコミットした時点で応答します。
  All,
  /// 上記以外の値。古いブローカーでは確認を待つレプリカ数として解釈されます。
  Custom(i16),
}

impl RequiredAcks {
  pub fn as_i16(self) -> i16 {
    match self {
      RequiredAcks::NoResponse => 0,
      RequiredAcks::Leader => 1,
      RequiredAcks::All => -1,
      RequiredAcks::Custom(value) => value,
    }
  }
}

impl PartialEq for RequiredAcks {
  fn eq(&self, other: &Self) -> bool {
    self.as_i16() == other.as_i16()
  }
}

impl Eq for RequiredAcks {}

impl Hash for RequiredAcks {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.as_i16().hash(state)
  }
}

impl Default for RequiredAcks {
  fn default() -> Self {
    RequiredAcks::NoResponse
  }
}

impl From<i16> for RequiredAcks {
  fn from(value: i16) -> Self {
    match value {
      0 => RequiredAcks::NoResponse,
      1 => RequiredAcks::Leader,
      -1 => RequiredAcks::All,
      other => RequiredAcks::Custom(other),
    }
  }
}

impl Wire for RequiredAcks {
  fn length(&self) -> usize {
    2
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    wire::write_i16(buf, self.as_i16())
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    wire::read_i16(buf).map(RequiredAcks::from)
  }
}
