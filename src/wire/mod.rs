use std::io::{Cursor, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::Error;
use crate::Result;

#[cfg(test)]
mod test;

/// 文字列の長さとして null を表す値です。
pub const NULL_LENGTH: i16 = -1;

/// 配列の要素数として null を表す値です。
pub const NULL_COUNT: i32 = -1;

/// 長さ 2 バイトのプレフィクスで表現できる文字列の最大バイト長です。0x7FFF (32,767バイト) を表しています。
pub const MAX_STRING_LENGTH: usize = i16::MAX as usize;

/// 長さ 4 バイトのプレフィクスで表現できる最大の要素数またはバイト長です。
pub const MAX_SEQUENCE_LENGTH: usize = i32::MAX as usize;

/// 配列のデコード時に要素数の申告値を信用して確保するバッファの上限です。これを超える要素は読み込みながら拡張します。
const PREALLOCATION_LIMIT: usize = 1024;

/// ワイヤ上のバイト列とのあいだで相互に変換できる型です。プリミティブ、文字列、配列、およびそれらを組み合わせた
/// 複合メッセージがこのトレイトを実装します。
///
/// `length()` は `write_to()` が出力するバイト数と常に一致しなければなりません。値は構築後に変更されないため、
/// 長さは何度参照しても同じ値を返します。
pub trait Wire: Sized {
  /// この値をシリアライズしたときのバイト長を参照します。
  fn length(&self) -> usize;

  /// この値をビッグエンディアンで `buf` に書き込みます。
  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()>;

  /// `buf` の現在位置からこの型の値を読み込みます。読み込んだ分だけ `buf` の位置が進みます。
  fn read_from<R: Read>(buf: &mut R) -> Result<Self>;
}

/// 指定された値をバイト列にシリアライズします。出力したバイト長が `length()` と異なる場合は実装の不具合であり
/// `Error::SizeMismatch` を返します。
pub fn encode<T: Wire>(value: &T) -> Result<Vec<u8>> {
  let declared = value.length();
  let mut buffer = Vec::with_capacity(declared);
  value.write_to(&mut buffer)?;
  verify_size(declared, buffer.len())?;
  Ok(buffer)
}

/// バイト列から値を復元します。`bytes` はちょうど 1 つの値を表している必要があり、読み残しがある場合は
/// `Error::TrailingBytes` となります。
pub fn decode<T: Wire>(bytes: &[u8]) -> Result<T> {
  let mut cursor = Cursor::new(bytes);
  let value = T::read_from(&mut cursor)?;
  let remaining = bytes.len() - cursor.position() as usize;
  if remaining != 0 {
    Err(Error::TrailingBytes { remaining })
  } else {
    Ok(value)
  }
}

fn verify_size(declared: usize, actual: usize) -> Result<()> {
  if declared != actual {
    log::error!("encoded {} bytes for a value declaring {} bytes", actual, declared);
    Err(Error::SizeMismatch { declared, actual })
  } else {
    Ok(())
  }
}

/// 文字列がワイヤ上の 2 バイト長で表現できることを検証します。
pub fn verify_string(value: &str) -> Result<()> {
  if value.len() > MAX_STRING_LENGTH {
    Err(Error::PayloadTooLarge { length: value.len(), maximum: MAX_STRING_LENGTH })
  } else {
    Ok(())
  }
}

// ##############################################################################################
// プリミティブ

impl Wire for i16 {
  fn length(&self) -> usize {
    2
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    write_i16(buf, *self)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    read_i16(buf)
  }
}

impl Wire for i32 {
  fn length(&self) -> usize {
    4
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    write_i32(buf, *self)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    read_i32(buf)
  }
}

impl Wire for i64 {
  fn length(&self) -> usize {
    8
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    write_i64(buf, *self)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    read_i64(buf)
  }
}

// ##############################################################################################
// 文字列
// 2 バイトの長さ (文字数ではなく UTF-8 のバイト数) に続いて UTF-8 のバイト列が続く。長さ -1 は null を表す。

/// null を許容しない文字列。長さ -1 を読み込んだ場合は `Error::UnexpectedNull` となります。
impl Wire for String {
  fn length(&self) -> usize {
    2 + self.len()
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    write_str(buf, self)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    read_nullable_str(buf)?.ok_or(Error::UnexpectedNull)
  }
}

/// null を許容する文字列。`None` は長さ -1 でペイロードを持たず、空文字列は長さ 0 となります。
impl Wire for Option<String> {
  fn length(&self) -> usize {
    2 + self.as_ref().map(|s| s.len()).unwrap_or(0)
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    match self {
      Some(value) => write_str(buf, value),
      None => write_i16(buf, NULL_LENGTH),
    }
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    read_nullable_str(buf)
  }
}

// ##############################################################################################
// 配列
// 4 バイトの要素数に続いて各要素のシリアライズ結果が呼び出し側の指定した順序で並ぶ。要素数 -1 を null と
// 見なすかはフィールドごとに異なるため、null を許容するフィールドは `Option<Vec<T>>` として宣言する。

/// null を許容しない配列。負の要素数は `Error::IllegalLength` となります。
impl<T: Wire> Wire for Vec<T> {
  fn length(&self) -> usize {
    4 + self.iter().map(|element| element.length()).sum::<usize>()
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    write_elements(buf, self)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    match read_i32(buf)? {
      count if count < 0 => Err(Error::IllegalLength { length: count as i64 }),
      count => read_elements(buf, count as usize),
    }
  }
}

/// null を許容する配列。`None` は要素数 -1 として表現されます。
impl<T: Wire> Wire for Option<Vec<T>> {
  fn length(&self) -> usize {
    self.as_ref().map(|elements| elements.length()).unwrap_or(4)
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    match self {
      Some(elements) => write_elements(buf, elements),
      None => write_i32(buf, NULL_COUNT),
    }
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Self> {
    match read_i32(buf)? {
      NULL_COUNT => Ok(None),
      count if count < 0 => Err(Error::IllegalLength { length: count as i64 }),
      count => read_elements(buf, count as usize).map(Some),
    }
  }
}

fn write_elements<W: Write, T: Wire>(buf: &mut W, elements: &[T]) -> Result<()> {
  if elements.len() > MAX_SEQUENCE_LENGTH {
    return Err(Error::PayloadTooLarge { length: elements.len(), maximum: MAX_SEQUENCE_LENGTH });
  }
  write_i32(buf, elements.len() as i32)?;
  for element in elements {
    element.write_to(buf)?;
  }
  Ok(())
}

fn read_elements<R: Read, T: Wire>(buf: &mut R, count: usize) -> Result<Vec<T>> {
  let mut elements = Vec::with_capacity(count.min(PREALLOCATION_LIMIT));
  for _ in 0..count {
    elements.push(T::read_from(buf)?);
  }
  Ok(elements)
}

#[inline]
pub(crate) fn write_i16<W: Write>(buf: &mut W, value: i16) -> Result<()> {
  buf.write_i16::<BigEndian>(value).map_err(Error::from)
}

#[inline]
pub(crate) fn read_i16<R: Read>(buf: &mut R) -> Result<i16> {
  buf.read_i16::<BigEndian>().map_err(Error::from)
}

#[inline]
pub(crate) fn write_i32<W: Write>(buf: &mut W, value: i32) -> Result<()> {
  buf.write_i32::<BigEndian>(value).map_err(Error::from)
}

#[inline]
pub(crate) fn read_i32<R: Read>(buf: &mut R) -> Result<i32> {
  buf.read_i32::<BigEndian>().map_err(Error::from)
}

#[inline]
pub(crate) fn write_i64<W: Write>(buf: &mut W, value: i64) -> Result<()> {
  buf.write_i64::<BigEndian>(value).map_err(Error::from)
}

#[inline]
pub(crate) fn read_i64<R: Read>(buf: &mut R) -> Result<i64> {
  buf.read_i64::<BigEndian>().map_err(Error::from)
}

#[inline]
fn write_str<W: Write>(buf: &mut W, value: &str) -> Result<()> {
  verify_string(value)?;
  write_i16(buf, value.len() as i16)?;
  buf.write_all(value.as_bytes()).map_err(Error::from)
}

#[inline]
fn read_nullable_str<R: Read>(buf: &mut R) -> Result<Option<String>> {
  match read_i16(buf)? {
    NULL_LENGTH => Ok(None),
    length if length < 0 => Err(Error::IllegalLength { length: length as i64 }),
    length => {
      let mut bytes = vec![0u8; length as usize];
      buf.read_exact(&mut bytes)?;
      Ok(Some(String::from_utf8(bytes)?))
    }
  }
}
