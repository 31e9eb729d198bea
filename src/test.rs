use std::sync::Once;

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use rand::prelude::StdRng;
use rand::{RngCore, SeedableRng};

static LOGGER: Once = Once::new();

/// テスト実行中のログをコンソールへ出力するように設定します。何度呼び出しても最初の 1 回だけが有効です。
pub fn init_logger() {
  LOGGER.call_once(|| {
    let console = ConsoleAppender::builder()
      .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S%.3f)} {h({l:5})} {M} - {m}{n}")))
      .build();
    let config = Config::builder()
      .appender(Appender::builder().build("console", Box::new(console)))
      .build(Root::builder().appender("console").build(LevelFilter::Trace));
    if let Ok(config) = config {
      let _ = log4rs::init_config(config);
    }
  });
}

/// トピック名などに使用する文字。マルチバイト文字を含めて文字数とバイト長が異なるケースを生成する。
const NAME_CHARACTERS: &[char] = &[
  'a', 'b', 'c', 'x', 'y', 'z', '0', '1', '9', '-', '_', '.', 'あ', 'い', 'う', '蜂', '🐝',
];

/// 一様にランダムなテスト用の値を採集するための構造体。シードを指定することでランダムだが決定論的な値を生成する。
pub struct SampleValues {
  rng: Box<StdRng>,
}

impl SampleValues {
  /// シードを指定してサンプル値ジェネレータを初期化します。
  pub fn new(seed: u64) -> SampleValues {
    let mut s = [0u8; 32];
    for i in 0..8 {
      s[i] = ((seed >> (i * 8)) & 0xFF) as u8
    }
    SampleValues { rng: Box::new(rand::rngs::StdRng::from_seed(s)) }
  }

  pub fn next_bool(&mut self) -> bool {
    (self.rng.next_u32() & 0x01) != 0
  }

  pub fn next_i16(&mut self) -> i16 {
    (self.rng.next_u32() & 0xFFFF) as u16 as i16
  }

  pub fn next_i32(&mut self) -> i32 {
    self.rng.next_u32() as i32
  }

  pub fn next_i64(&mut self) -> i64 {
    self.rng.next_u64() as i64
  }

  /// 0 以上 `bound` 未満の値を返します。
  pub fn next_below(&mut self, bound: u32) -> u32 {
    self.rng.next_u32() % bound
  }

  pub fn next_bytes(&mut self, length: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; length];
    self.rng.fill_bytes(&mut bytes);
    bytes
  }

  /// 指定された文字数のランダムな文字列を生成します。
  pub fn next_string(&mut self, characters: usize) -> String {
    (0..characters).map(|_| NAME_CHARACTERS[self.next_below(NAME_CHARACTERS.len() as u32) as usize]).collect()
  }
}

#[test]
fn test_sample_values() {
  // シードによって乱数が変動する
  let seeds = [0u64, 1, 2, 3, 4, 5, 100, 200];
  for i in 1..seeds.len() {
    let mut s1 = SampleValues::new(seeds[i - 1]);
    let mut s2 = SampleValues::new(seeds[i]);
    assert_ne!(s1.next_i64(), s2.next_i64());
    assert_ne!(s1.next_bytes(256), s2.next_bytes(256));
    assert_ne!(s1.next_string(64), s2.next_string(64));
  }

  // 同じシードからは同じ値が生成される
  let mut s1 = SampleValues::new(42u64);
  let mut s2 = SampleValues::new(42u64);
  assert_eq!(s1.next_string(32), s2.next_string(32));

  // 指定した長さのバイト配列、指定した文字数の文字列を作成している
  let mut sample = SampleValues::new(783629830u64);
  assert_eq!(sample.next_bytes(1024).len(), 1024);
  assert_eq!(sample.next_string(100).chars().count(), 100);
  assert!(sample.next_below(10) < 10);
}
