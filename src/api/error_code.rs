use std::hash::{Hash, Hasher};
use std::io::{Read, Write};

use thiserror::Error as ThisError;

use crate::wire::{self, Wire};
use crate::Result;

/// ブローカーが返す 2 バイトのエラーコードです。
///
/// 既知のコードはそれぞれの列挙子に対応し、それ以外の値は `Unrecognized` として元の値を保持します。ブローカー側の
/// エラーコードはクライアントとは独立して追加されていくため、未知のコードを読み込んでもデコードは失敗しません。
///
/// 比較とハッシュはワイヤ上の値で行われます。既知のコードを包んだ `Unrecognized(3)` は `UnknownTopicOrPartition`
/// と等しく扱われます。
#[derive(ThisError, Debug, Copy, Clone)]
pub enum ErrorCode {
  #[error("the server experienced an unexpected error when processing the request")]
  UnknownServerError,
  #[error("no error")]
  NoError,
  #[error("the requested offset is not within the range of offsets maintained by the server")]
  OffsetOutOfRange,
  #[error("the message contents does not match the message CRC or the message is otherwise corrupt")]
  CorruptMessage,
  #[error("this server does not host this topic-partition")]
  UnknownTopicOrPartition,
  #[error("the requested fetch size is invalid")]
  InvalidFetchSize,
  #[error("there is no leader for this topic-partition as we are in the middle of a leadership election")]
  LeaderNotAvailable,
  #[error("this server is not the leader for that topic-partition")]
  NotLeaderForPartition,
  #[error("the request timed out")]
  RequestTimedOut,
  #[error("the broker is not available")]
  BrokerNotAvailable,
  #[error("the replica is not available for the requested topic-partition")]
  ReplicaNotAvailable,
  #[error("the request included a message larger than the max message size the server will accept")]
  MessageTooLarge,
  #[error("the controller moved to another broker")]
  StaleControllerEpoch,
  #[error("the metadata field of the offset request was too large")]
  OffsetMetadataTooLarge,
  #[error("the server disconnected before a response was received")]
  NetworkException,
  #[error("the coordinator is loading and hence can't process requests")]
  CoordinatorLoadInProgress,
  #[error("the coordinator is not available")]
  CoordinatorNotAvailable,
  #[error("this is not the correct coordinator")]
  NotCoordinator,
  #[error("the request attempted to perform an operation on an invalid topic")]
  InvalidTopic,
  #[error("the request included message batch larger than the configured segment size on the server")]
  RecordListTooLarge,
  #[error("messages are rejected since there are fewer in-sync replicas than required")]
  NotEnoughReplicas,
  #[error("messages are written to the log, but to fewer in-sync replicas than required")]
  NotEnoughReplicasAfterAppend,
  #[error("produce request specified an invalid value for required acks")]
  InvalidRequiredAcks,
  #[error("specified group generation id is not valid")]
  IllegalGeneration,
  #[error("the group member's supported protocols are incompatible with those of existing members")]
  InconsistentGroupProtocol,
  #[error("the configured group id is invalid")]
  InvalidGroupId,
  #[error("the coordinator is not aware of this member")]
  UnknownMemberId,
  #[error("the session timeout is not within the range allowed by the broker")]
  InvalidSessionTimeout,
  #[error("the group is rebalancing, so a rejoin is needed")]
  RebalanceInProgress,
  #[error("the committing offset data size is not valid")]
  InvalidCommitOffsetSize,
  #[error("topic authorization failed")]
  TopicAuthorizationFailed,
  #[error("group authorization failed")]
  GroupAuthorizationFailed,
  #[error("cluster authorization failed")]
  ClusterAuthorizationFailed,
  #[error("the timestamp of the message is out of acceptable range")]
  InvalidTimestamp,
  #[error("the broker does not support the requested SASL mechanism")]
  UnsupportedSaslMechanism,
  #[error("request is not valid given the current SASL state")]
  IllegalSaslState,
  #[error("the version of API is not supported")]
  UnsupportedVersion,
  #[error("topic with this name already exists")]
  TopicAlreadyExists,
  #[error("number of partitions is below 1")]
  InvalidPartitions,
  #[error("replication factor is below 1 or larger than the number of available brokers")]
  InvalidReplicationFactor,
  #[error("replica assignment is invalid")]
  InvalidReplicaAssignment,
  #[error("configuration is invalid")]
  InvalidConfig,
  #[error("this is not the correct controller for this cluster")]
  NotController,
  #[error("this most likely occurs because of a request being malformed by the client library")]
  InvalidRequest,
  #[error("the message format version on the broker does not support the request")]
  UnsupportedForMessageFormat,
  #[error("request parameters do not satisfy the configured policy")]
  PolicyViolation,
  #[error("the broker received an out of order sequence number")]
  OutOfOrderSequenceNumber,
  #[error("the broker received a duplicate sequence number")]
  DuplicateSequenceNumber,
  #[error("producer attempted an operation with an old epoch")]
  InvalidProducerEpoch,
  #[error("the producer attempted a transactional operation in an invalid state")]
  InvalidTxnState,
  #[error("the producer attempted to use a producer id which is not currently assigned to its transactional id")]
  InvalidProducerIdMapping,
  #[error("the transaction timeout is larger than the maximum value allowed by the broker")]
  InvalidTransactionTimeout,
  #[error("the producer attempted to update a transaction while another concurrent operation on the same transaction was ongoing")]
  ConcurrentTransactions,
  #[error("the transaction coordinator sending a WriteTxnMarker is no longer the current coordinator")]
  TransactionCoordinatorFenced,
  #[error("transactional id authorization failed")]
  TransactionalIdAuthorizationFailed,
  #[error("security features are disabled")]
  SecurityDisabled,
  #[error("the broker did not attempt to execute this operation")]
  OperationNotAttempted,
  #[error("unrecognized error code: {0}")]
  Unrecognized(i16),
}

impl ErrorCode {
  pub fn as_i16(self) -> i16 {
    match self {
      ErrorCode::UnknownServerError => -1,
      ErrorCode::NoError => 0,
      ErrorCode::OffsetOutOfRange => 1,
      ErrorCode::CorruptMessage => 2,
      ErrorCode::UnknownTopicOrPartition => 3,
      ErrorCode::InvalidFetchSize => 4,
      ErrorCode::LeaderNotAvailable => 5,
      ErrorCode::NotLeaderForPartition => 6,
      ErrorCode::RequestTimedOut => 7,
      ErrorCode::BrokerNotAvailable => 8,
      ErrorCode::ReplicaNotAvailable => 9,
      ErrorCode::MessageTooLarge => 10,
      ErrorCode::StaleControllerEpoch => 11,
      ErrorCode::OffsetMetadataTooLarge => 12,
      ErrorCode::NetworkException => 13,
      ErrorCode::CoordinatorLoadInProgress => 14,
      ErrorCode::CoordinatorNotAvailable => 15,
      ErrorCode::NotCoordinator => 16,
      ErrorCode::InvalidTopic => 17,
      ErrorCode::RecordListTooLarge => 18,
      ErrorCode::NotEnoughReplicas => 19,
      ErrorCode::NotEnoughReplicasAfterAppend => 20,
      ErrorCode::InvalidRequiredAcks => 21,
      ErrorCode::IllegalGeneration => 22,
      ErrorCode::InconsistentGroupProtocol => 23,
      ErrorCode::InvalidGroupId => 24,
      ErrorCode::UnknownMemberId => 25,
      ErrorCode::InvalidSessionTimeout => 26,
      ErrorCode::RebalanceInProgress => 27,
      ErrorCode::InvalidCommitOffsetSize => 28,
      ErrorCode::TopicAuthorizationFailed => 29,
      ErrorCode::GroupAuthorizationFailed => 30,
      ErrorCode::ClusterAuthorizationFailed => 31,
      ErrorCode::InvalidTimestamp => 32,
      ErrorCode::UnsupportedSaslMechanism => 33,
      ErrorCode::IllegalSaslState => 34,
      ErrorCode::UnsupportedVersion => 35,
      ErrorCode::TopicAlreadyExists => 36,
      ErrorCode::InvalidPartitions => 37,
      ErrorCode::InvalidReplicationFactor => 38,
      ErrorCode::InvalidReplicaAssignment => 39,
      ErrorCode::InvalidConfig => 40,
      ErrorCode::NotController => 41,
      ErrorCode::InvalidRequest => 42,
      ErrorCode::UnsupportedForMessageFormat => 43,
      ErrorCode::PolicyViolation => 44,
      ErrorCode::OutOfOrderSequenceNumber => 45,
      ErrorCode::DuplicateSequenceNumber => 46,
      ErrorCode::InvalidProducerEpoch => 47,
      ErrorCode::InvalidTxnState => 48,
      ErrorCode::InvalidProducerIdMapping => 49,
      ErrorCode::InvalidTransactionTimeout => 50,
      ErrorCode::ConcurrentTransactions => 51,
      ErrorCode::TransactionCoordinatorFenced => 52,
      ErrorCode::TransactionalIdAuthorizationFailed => 53,
      ErrorCode::SecurityDisabled => 54,
      ErrorCode::OperationNotAttempted => 55,
      ErrorCode::Unrecognized(value) => value,
    }
  }

  /// エラーが発生していないことを示すコードの場合 `true` を返します。
  pub fn is_ok(self) -> bool {
    self == ErrorCode::NoError
  }

  /// 同じリクエストを再送することで成功する可能性があるエラーの場合 `true` を返します。
  pub fn is_retriable(self) -> bool {
    matches!(
      self.canonical(),
      ErrorCode::CorruptMessage
        | ErrorCode::UnknownTopicOrPartition
        | ErrorCode::LeaderNotAvailable
        | ErrorCode::NotLeaderForPartition
        | ErrorCode::RequestTimedOut
        | ErrorCode::NetworkException
        | ErrorCode::CoordinatorLoadInProgress
        | ErrorCode::CoordinatorNotAvailable
        | ErrorCode::NotCoordinator
        | ErrorCode::NotEnoughReplicas
        | ErrorCode::NotEnoughReplicasAfterAppend
        | ErrorCode::NotController
        | ErrorCode::ConcurrentTransactions
    )
  }

  /// 既知のコードであれば対応する列挙子を返します。
  fn known(value: i16) -> Option<ErrorCode> {
    let code = match value {
      -1 => ErrorCode::UnknownServerError,
      0 => ErrorCode::NoError,
      1 => ErrorCode::OffsetOutOfRange,
      2 => ErrorCode::CorruptMessage,
      3 => ErrorCode::UnknownTopicOrPartition,
      4 => ErrorCode::InvalidFetchSize,
      5 => ErrorCode::LeaderNotAvailable,
      6 => ErrorCode::NotLeaderForPartition,
      7 => ErrorCode::RequestTimedOut,
      8 => ErrorCode::BrokerNotAvailable,
      9 => ErrorCode::ReplicaNotAvailable,
      10 => ErrorCode::MessageTooLarge,
      11 => ErrorCode::StaleControllerEpoch,
      12 => ErrorCode::OffsetMetadataTooLarge,
      13 => ErrorCode::NetworkException,
      14 => ErrorCode::CoordinatorLoadInProgress,
      15 => ErrorCode::CoordinatorNotAvailable,
      16 => ErrorCode::NotCoordinator,
      17 => ErrorCode::InvalidTopic,
      18 => ErrorCode::RecordListTooLarge,
      19 => ErrorCode::NotEnoughReplicas,
      20 => ErrorCode::NotEnoughReplicasAfterAppend,
      21 => ErrorCode::InvalidRequiredAcks,
      22 => ErrorCode::IllegalGeneration,
      23 => ErrorCode::InconsistentGroupProtocol,
      24 => ErrorCode::InvalidGroupId,
      25 => ErrorCode::UnknownMemberId,
      26 => ErrorCode::InvalidSessionTimeout,
      27 => ErrorCode::RebalanceInProgress,
      28 => ErrorCode::InvalidCommitOffsetSize,
      29 => ErrorCode::TopicAuthorizationFailed,
      30 => ErrorCode::GroupAuthorizationFailed,
      31 => ErrorCode::ClusterAuthorizationFailed,
      32 => ErrorCode::InvalidTimestamp,
      33 => ErrorCode::UnsupportedSaslMechanism,
      34 => ErrorCode::IllegalSaslState,
      35 => ErrorCode::UnsupportedVersion,
      36 => ErrorCode::TopicAlreadyExists,
      37 => ErrorCode::InvalidPartitions,
      38 => ErrorCode::InvalidReplicationFactor,
      39 => ErrorCode::InvalidReplicaAssignment,
      40 => ErrorCode::InvalidConfig,
      41 => ErrorCode::NotController,
      42 => ErrorCode::InvalidRequest,
      43 => ErrorCode::UnsupportedForMessageFormat,
      44 => ErrorCode::PolicyViolation,
      45 => ErrorCode::OutOfOrderSequenceNumber,
      46 => ErrorCode::DuplicateSequenceNumber,
      47 => ErrorCode::InvalidProducerEpoch,
      48 => ErrorCode::InvalidTxnState,
      49 => ErrorCode::InvalidProducerIdMapping,
      50 => ErrorCode::InvalidTransactionTimeout,
      51 => ErrorCode::ConcurrentTransactions,
      52 => ErrorCode::TransactionCoordinatorFenced,
      53 => ErrorCode::TransactionalIdAuthorizationFailed,
      54 => ErrorCode::SecurityDisabled,
      55 => ErrorCode::OperationNotAttempted,
      _ => return None,
    };
    Some(code)
  }

  /// `Unrecognized` に包まれた既知のコードを対応する列挙子に置き換えます。
  fn canonical(self) -> ErrorCode {
    match self {
      ErrorCode::Unrecognized(value) => ErrorCode::known(value).unwrap_or(self),
      known => known,
    }
  }
}

impl PartialEq for ErrorCode {
  fn eq(&self, other: &Self) -> bool {
    self.as_i16() == other.as_i16()
  }
}

impl Eq for ErrorCode {}

impl Hash for ErrorCode {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.as_i16().hash(state)
  }
}

impl Default for ErrorCode {
  fn default() -> Self {
    ErrorCode::NoError
  }
}

impl From<i16> for ErrorCode {
  fn from(value: i16) -> Self {
    ErrorCode::known(value).unwrap_or_else(|| {
      log::warn!("unrecognized error code: {}", value);
      ErrorCode::Unrecognized(value)
    })
  }
}

impl Wire for ErrorCode {
  fn length(&self) -> usize {
    2
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    wire::write_i16(buf, self.as_i16())
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    wire::read_i16(buf).map(ErrorCode::from)
  }
}
