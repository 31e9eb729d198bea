use std::io::{self, Cursor, ErrorKind, Read, Write};

use crate::error::Error;
use crate::test::{init_logger, SampleValues};
use crate::wire::{decode, encode, Wire, MAX_STRING_LENGTH};
use crate::Result;

#[test]
fn test_primitives_are_big_endian() {
  assert_eq!(encode(&0x0102i16).unwrap(), vec![0x01, 0x02]);
  assert_eq!(encode(&0x01020304i32).unwrap(), vec![0x01, 0x02, 0x03, 0x04]);
  assert_eq!(encode(&0x0102030405060708i64).unwrap(), vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);

  // 負の値は 2 の補数で表現される
  assert_eq!(encode(&-1i16).unwrap(), vec![0xFF, 0xFF]);
  assert_eq!(encode(&-2i32).unwrap(), vec![0xFF, 0xFF, 0xFF, 0xFE]);
  assert_eq!(decode::<i64>(&[0xFF; 8]).unwrap(), -1i64);
  assert_eq!(decode::<i16>(&[0x80, 0x00]).unwrap(), i16::MIN);
}

#[test]
fn test_primitives_restore_any_value() {
  let mut sample = SampleValues::new(8713098237411u64);
  for _ in 0..100 {
    let (a, b, c) = (sample.next_i16(), sample.next_i32(), sample.next_i64());
    assert_eq!(decode::<i16>(&encode(&a).unwrap()).unwrap(), a);
    assert_eq!(decode::<i32>(&encode(&b).unwrap()).unwrap(), b);
    assert_eq!(decode::<i64>(&encode(&c).unwrap()).unwrap(), c);
  }
}

#[test]
fn test_truncated_primitives() {
  assert_eq!(decode::<i16>(&[0x00]), Err(Error::Truncated));
  assert_eq!(decode::<i32>(&[0x00, 0x00, 0x01]), Err(Error::Truncated));
  assert_eq!(decode::<i64>(&[0x00; 7]), Err(Error::Truncated));
  assert_eq!(decode::<i64>(&[]), Err(Error::Truncated));
}

#[test]
fn test_sequential_reads_share_cursor() {
  let bytes = [0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x03, b'a', b'b', b'c'];
  let mut cursor = Cursor::new(&bytes[..]);
  assert_eq!(i16::read_from(&mut cursor).unwrap(), 1);
  assert_eq!(i32::read_from(&mut cursor).unwrap(), 2);
  assert_eq!(String::read_from(&mut cursor).unwrap(), "abc");
  assert_eq!(cursor.position() as usize, bytes.len());
  assert_eq!(i16::read_from(&mut cursor), Err(Error::Truncated));
}

#[test]
fn test_null_and_empty_strings() {
  // null は長さ -1 でペイロードを持たない
  let null: Option<String> = None;
  assert_eq!(null.length(), 2);
  assert_eq!(encode(&null).unwrap(), vec![0xFF, 0xFF]);
  assert_eq!(decode::<Option<String>>(&[0xFF, 0xFF]).unwrap(), None);

  // 空文字列は長さ 0
  let empty = Some(String::new());
  assert_eq!(encode(&empty).unwrap(), vec![0x00, 0x00]);
  assert_eq!(encode(&String::new()).unwrap(), vec![0x00, 0x00]);
  assert_eq!(decode::<Option<String>>(&[0x00, 0x00]).unwrap(), Some(String::new()));

  // null を許容しない文字列で null を読み込むと失敗する
  assert_eq!(decode::<String>(&[0xFF, 0xFF]), Err(Error::UnexpectedNull));
}

#[test]
fn test_string_length_is_byte_count() {
  let value = "蜂a".to_string();
  assert_eq!(value.length(), 2 + 4);
  assert_eq!(encode(&value).unwrap(), vec![0x00, 0x04, 0xE8, 0x9C, 0x82, b'a']);
  assert_eq!(decode::<String>(&[0x00, 0x04, 0xE8, 0x9C, 0x82, b'a']).unwrap(), value);

  let mut sample = SampleValues::new(3092847120985u64);
  for characters in 0..64 {
    let value = sample.next_string(characters);
    let bytes = encode(&value).unwrap();
    assert_eq!(bytes.len(), 2 + value.len());
    assert_eq!(decode::<String>(&bytes).unwrap(), value);
  }
}

#[test]
fn test_malformed_strings() {
  // 不正な UTF-8
  let result = decode::<String>(&[0x00, 0x02, 0xC3, 0x28]);
  assert!(matches!(result, Err(Error::InvalidUtf8 { .. })));

  // 長さに対してバイト列が足りない
  assert_eq!(decode::<String>(&[0x00, 0x05, b'a', b'b']), Err(Error::Truncated));
  assert_eq!(decode::<Option<String>>(&[0x00]), Err(Error::Truncated));

  // -1 以外の負の長さ
  assert_eq!(decode::<Option<String>>(&[0xFF, 0xFE]), Err(Error::IllegalLength { length: -2 }));
}

#[test]
fn test_too_long_string() {
  let value = "a".repeat(MAX_STRING_LENGTH);
  assert_eq!(encode(&value).unwrap().len(), 2 + MAX_STRING_LENGTH);

  let value = "a".repeat(MAX_STRING_LENGTH + 1);
  assert_eq!(
    encode(&value),
    Err(Error::PayloadTooLarge { length: MAX_STRING_LENGTH + 1, maximum: MAX_STRING_LENGTH })
  );
}

#[test]
fn test_sequence_preserves_order() {
  let values = vec![3i32, 1, 2];
  assert_eq!(values.length(), 4 + 3 * 4);
  let bytes = encode(&values).unwrap();
  assert_eq!(bytes, vec![0, 0, 0, 3, 0, 0, 0, 3, 0, 0, 0, 1, 0, 0, 0, 2]);
  assert_eq!(decode::<Vec<i32>>(&bytes).unwrap(), values);

  // 可変長の要素はそれぞれ自身の長さだけ読み進める
  let names = vec!["a".to_string(), String::new(), "bcd".to_string()];
  let bytes = encode(&names).unwrap();
  assert_eq!(bytes, vec![0, 0, 0, 3, 0, 1, b'a', 0, 0, 0, 3, b'b', b'c', b'd']);
  assert_eq!(decode::<Vec<String>>(&bytes).unwrap(), names);

  let empty: Vec<i64> = Vec::new();
  assert_eq!(encode(&empty).unwrap(), vec![0, 0, 0, 0]);
}

#[test]
fn test_sequence_count_exceeding_input() {
  // 宣言された要素数に満たない場合は途中までの配列を返さずに失敗する
  assert_eq!(decode::<Vec<i32>>(&[0, 0, 0, 3, 0, 0, 0, 1, 0, 0, 0, 2]), Err(Error::Truncated));
  assert_eq!(decode::<Vec<String>>(&[0, 0, 0, 2, 0, 1, b'a']), Err(Error::Truncated));

  // 巨大な要素数を申告されてもバッファを確保しきる前に入力の終端で失敗する
  assert_eq!(decode::<Vec<i64>>(&[0x7F, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0]), Err(Error::Truncated));
}

#[test]
fn test_nullable_sequence() {
  // null を許容しない配列では負の要素数はエラー
  assert_eq!(decode::<Vec<i32>>(&[0xFF, 0xFF, 0xFF, 0xFF]), Err(Error::IllegalLength { length: -1 }));

  // null を許容する配列では -1 が null、0 が空配列
  let null: Option<Vec<i32>> = None;
  assert_eq!(null.length(), 4);
  assert_eq!(encode(&null).unwrap(), vec![0xFF, 0xFF, 0xFF, 0xFF]);
  assert_eq!(decode::<Option<Vec<i32>>>(&[0xFF, 0xFF, 0xFF, 0xFF]).unwrap(), None);
  assert_eq!(decode::<Option<Vec<i32>>>(&[0, 0, 0, 0]).unwrap(), Some(Vec::new()));
  assert_eq!(decode::<Option<Vec<i32>>>(&[0, 0, 0, 1, 0, 0, 0, 7]).unwrap(), Some(vec![7]));
  assert_eq!(decode::<Option<Vec<i32>>>(&[0xFF, 0xFF, 0xFF, 0xFE]), Err(Error::IllegalLength { length: -2 }));
}

#[test]
fn test_trailing_bytes() {
  assert_eq!(decode::<i16>(&[0x00, 0x01, 0x02]), Err(Error::TrailingBytes { remaining: 1 }));
  assert_eq!(decode::<Vec<i16>>(&[0, 0, 0, 0, 0, 0]), Err(Error::TrailingBytes { remaining: 2 }));
}

/// 申告する長さと実際に出力するバイト数が一致しない不正な実装。
struct Inconsistent;

impl Wire for Inconsistent {
  fn length(&self) -> usize {
    3
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    0x0102i16.write_to(buf)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    i16::read_from(buf).map(|_| Inconsistent)
  }
}

#[test]
fn test_size_mismatch() {
  init_logger();
  assert_eq!(encode(&Inconsistent), Err(Error::SizeMismatch { declared: 3, actual: 2 }));
  assert_eq!(encode(&vec![Inconsistent, Inconsistent]), Err(Error::SizeMismatch { declared: 10, actual: 8 }));
}

/// 常に失敗する入出力。
struct Broken;

impl Write for Broken {
  fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
    Err(io::Error::new(ErrorKind::BrokenPipe, "connection closed"))
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl Read for Broken {
  fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
    Err(io::Error::new(ErrorKind::ConnectionReset, "connection reset"))
  }
}

#[test]
fn test_io_errors() {
  // 入力の終端以外の入出力エラーは種類とメッセージを保持する
  let closed = || Error::Io { kind: ErrorKind::BrokenPipe, message: "connection closed".to_string() };
  assert_eq!(0x0102i16.write_to(&mut Broken), Err(closed()));
  assert_eq!("abc".to_string().write_to(&mut Broken), Err(closed()));
  assert_eq!(vec![1i64, 2].write_to(&mut Broken), Err(closed()));

  let reset = || Error::Io { kind: ErrorKind::ConnectionReset, message: "connection reset".to_string() };
  assert_eq!(i32::read_from(&mut Broken), Err(reset()));
  assert_eq!(Option::<String>::read_from(&mut Broken), Err(reset()));

  // 入力の終端は Truncated として扱われる
  assert_eq!(Error::from(io::Error::from(ErrorKind::UnexpectedEof)), Error::Truncated);
}
