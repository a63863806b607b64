use byteorder::{BigEndian, ByteOrder};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ParseError {
    /// Not enough input; holds how many more bytes the read needed.
    Incomplete(usize),
    /// Input did not match at the given offset.
    Error(usize),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Positional cursor over a byte buffer. All multi-byte reads are big-endian,
/// which is the only byte order the class file format uses.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ByteParser<'src> {
    pub src: &'src [u8],
    pub offset: usize,
}

impl<'src> ByteParser<'src> {
    pub fn new(src: &'src [u8]) -> Self {
        ByteParser { src, offset: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.src.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Takes `tag.len()` bytes and returns an error if the bytes did not match.
    /// The parser is left untouched on failure.
    pub fn expect(&mut self, tag: &[u8]) -> ParseResult<()> {
        let found = self.peek(tag.len())?;
        match found.iter().zip(tag).position(|(a, b)| a != b) {
            Some(at) => Err(ParseError::Error(self.offset + at)),
            None => {
                self.offset += tag.len();
                Ok(())
            }
        }
    }

    /// Takes `len` bytes, and errors if there were not enough bytes remaining.
    pub fn take(&mut self, len: usize) -> ParseResult<&'src [u8]> {
        let res = self.peek(len)?;
        self.offset += len;
        Ok(res)
    }

    /// Like `take`, but does not advance the parser.
    pub fn peek(&self, len: usize) -> ParseResult<&'src [u8]> {
        if self.remaining() < len {
            Err(ParseError::Incomplete(len - self.remaining()))
        } else {
            Ok(&self.src[self.offset..self.offset + len])
        }
    }

    /// Moves the head to an absolute position. Seeking to `src.len()` is
    /// allowed and leaves the parser empty.
    pub fn seek(&mut self, offset: usize) -> ParseResult<()> {
        if offset > self.src.len() {
            Err(ParseError::Error(offset))
        } else {
            self.offset = offset;
            Ok(())
        }
    }

    /// Applies `func` exactly `len` times, and returns a vector of the items
    /// produced by `func`.
    pub fn seq<F, T, E>(&mut self, len: usize, mut func: F) -> Result<Vec<T>, E>
    where
        F: FnMut(&mut Self) -> Result<T, E>,
    {
        let mut vec = Vec::with_capacity(len);
        for _ in 0..len {
            vec.push(func(self)?);
        }
        Ok(vec)
    }

    pub fn parse_u8(&mut self) -> ParseResult<u8> {
        self.take(1).map(|b| b[0])
    }

    pub fn parse_u16(&mut self) -> ParseResult<u16> {
        self.take(2).map(BigEndian::read_u16)
    }

    pub fn parse_u32(&mut self) -> ParseResult<u32> {
        self.take(4).map(BigEndian::read_u32)
    }

    pub fn parse_i8(&mut self) -> ParseResult<i8> {
        self.take(1).map(|b| b[0] as i8)
    }

    pub fn parse_i16(&mut self) -> ParseResult<i16> {
        self.take(2).map(BigEndian::read_i16)
    }

    pub fn parse_i32(&mut self) -> ParseResult<i32> {
        self.take(4).map(BigEndian::read_i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_reads() {
        let mut parser = ByteParser::new(&[0xca, 0xfe, 0xba, 0xbe, 0xff, 0xfe, 0x80]);
        assert_eq!(parser.parse_u32(), Ok(0xcafebabe));
        assert_eq!(parser.parse_i16(), Ok(-2));
        assert_eq!(parser.parse_i8(), Ok(-128));
        assert!(parser.is_empty());
    }

    #[test]
    fn test_take_incomplete() {
        let mut parser = ByteParser::new(b"abc");
        assert_eq!(parser.take(5), Err(ParseError::Incomplete(2)));
        // failed reads don't move the head
        assert_eq!(parser.remaining(), 3);
    }

    #[test]
    fn test_expect_mismatch() {
        let mut parser = ByteParser::new(b"abcd");
        assert_eq!(parser.expect(b"abx"), Err(ParseError::Error(2)));
        assert_eq!(parser.offset, 0);
        assert_eq!(parser.expect(b"ab"), Ok(()));
        assert_eq!(parser.offset, 2);
    }

    #[test]
    fn test_seek() {
        let mut parser = ByteParser::new(b"abcd");
        parser.seek(3).unwrap();
        assert_eq!(parser.parse_u8(), Ok(b'd'));
        parser.seek(0).unwrap();
        assert_eq!(parser.parse_u8(), Ok(b'a'));
        assert_eq!(parser.seek(5), Err(ParseError::Error(5)));
    }

    #[test]
    fn test_seq() {
        let mut parser = ByteParser::new(&[0, 1, 0, 2, 0, 3]);
        let items: ParseResult<Vec<u16>> = parser.seq(3, |p| p.parse_u16());
        assert_eq!(items, Ok(vec![1, 2, 3]));
    }
}
