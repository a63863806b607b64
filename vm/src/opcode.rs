//! The subset of the instruction set the interpreter understands.
//!
//! Branch offsets are kept exactly as encoded: signed and relative to the
//! offset of the branch opcode itself.

use class::parse::{ByteParser, ParseError};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum InstructionParseError {
    UnknownOpcode(u8),
    /// The code ended in the middle of an instruction's operands.
    Truncated,
}

impl From<ParseError> for InstructionParseError {
    fn from(_: ParseError) -> Self {
        InstructionParseError::Truncated
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
    Nop,
    ConstInt(i32),
    PushByte(i8),
    PushShort(i16),
    /// Pool index of an `Integer` or `String`.
    LoadConstant(u8),
    LoadInt(u8),
    LoadRef(u8),
    StoreInt(u8),
    StoreRef(u8),
    Pop,
    Dup,
    AddInt,
    SubInt,
    /// Local index, signed increment.
    IncInt(u8, i8),
    IfNotZero(i16),
    IfNotEqualInt(i16),
    IfGreaterEqualInt(i16),
    Goto(i16),
    ReturnInt,
    ReturnRef,
    Return,
    GetStatic(u16),
    GetField(u16),
    PutField(u16),
    InvokeVirtual(u16),
    InvokeSpecial(u16),
    InvokeStatic(u16),
    New(u16),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct InstructionEntry {
    /// Offset of the opcode byte.
    pub start: usize,
    pub tag: u8,
    pub instruction: Instruction,
}

macro_rules! instructions {
    ($input:ident; $($opcode:expr => $name:ident, $display:expr, $parse:expr;)*) => {
        $(pub const $name: u8 = $opcode;)*

        /// Mnemonic for a supported opcode.
        pub fn instruction_name(tag: u8) -> Option<&'static str> {
            match tag {
                $($name => Some($display),)*
                _ => None,
            }
        }

        pub fn parse_instruction(
            $input: &mut ByteParser<'_>,
        ) -> Result<InstructionEntry, InstructionParseError> {
            use self::Instruction::*;

            let start = $input.offset;
            let tag = $input.parse_u8()?;
            Ok(InstructionEntry {
                start,
                tag,
                instruction: match tag {
                    $($name => $parse,)*

                    other => return Err(InstructionParseError::UnknownOpcode(other)),
                }
            })
        }
    };
}

instructions! {
    input;

    0x00 => NOP, "nop", Nop;
    0x02 => ICONST_M1, "iconst_m1", ConstInt(-1);
    0x03 => ICONST_0, "iconst_0", ConstInt(0);
    0x04 => ICONST_1, "iconst_1", ConstInt(1);
    0x05 => ICONST_2, "iconst_2", ConstInt(2);
    0x06 => ICONST_3, "iconst_3", ConstInt(3);
    0x07 => ICONST_4, "iconst_4", ConstInt(4);
    0x08 => ICONST_5, "iconst_5", ConstInt(5);
    0x10 => BIPUSH, "bipush", PushByte(input.parse_i8()?);
    0x11 => SIPUSH, "sipush", PushShort(input.parse_i16()?);
    0x12 => LDC, "ldc", LoadConstant(input.parse_u8()?);
    0x15 => ILOAD, "iload", LoadInt(input.parse_u8()?);
    0x19 => ALOAD, "aload", LoadRef(input.parse_u8()?);
    0x1a => ILOAD_0, "iload_0", LoadInt(0);
    0x1b => ILOAD_1, "iload_1", LoadInt(1);
    0x1c => ILOAD_2, "iload_2", LoadInt(2);
    0x1d => ILOAD_3, "iload_3", LoadInt(3);
    0x2a => ALOAD_0, "aload_0", LoadRef(0);
    0x2b => ALOAD_1, "aload_1", LoadRef(1);
    0x2c => ALOAD_2, "aload_2", LoadRef(2);
    0x2d => ALOAD_3, "aload_3", LoadRef(3);
    0x36 => ISTORE, "istore", StoreInt(input.parse_u8()?);
    0x3a => ASTORE, "astore", StoreRef(input.parse_u8()?);
    0x3b => ISTORE_0, "istore_0", StoreInt(0);
    0x3c => ISTORE_1, "istore_1", StoreInt(1);
    0x3d => ISTORE_2, "istore_2", StoreInt(2);
    0x3e => ISTORE_3, "istore_3", StoreInt(3);
    0x4b => ASTORE_0, "astore_0", StoreRef(0);
    0x4c => ASTORE_1, "astore_1", StoreRef(1);
    0x4d => ASTORE_2, "astore_2", StoreRef(2);
    0x4e => ASTORE_3, "astore_3", StoreRef(3);
    0x57 => POP, "pop", Pop;
    0x59 => DUP, "dup", Dup;
    0x60 => IADD, "iadd", AddInt;
    0x64 => ISUB, "isub", SubInt;
    0x84 => IINC, "iinc", IncInt(input.parse_u8()?, input.parse_i8()?);
    0x9a => IFNE, "ifne", IfNotZero(input.parse_i16()?);
    0xa0 => IF_ICMPNE, "if_icmpne", IfNotEqualInt(input.parse_i16()?);
    0xa2 => IF_ICMPGE, "if_icmpge", IfGreaterEqualInt(input.parse_i16()?);
    0xa7 => GOTO, "goto", Goto(input.parse_i16()?);
    0xac => IRETURN, "ireturn", ReturnInt;
    0xb0 => ARETURN, "areturn", ReturnRef;
    0xb1 => RETURN, "return", Return;
    0xb2 => GETSTATIC, "getstatic", GetStatic(input.parse_u16()?);
    0xb4 => GETFIELD, "getfield", GetField(input.parse_u16()?);
    0xb5 => PUTFIELD, "putfield", PutField(input.parse_u16()?);
    0xb6 => INVOKEVIRTUAL, "invokevirtual", InvokeVirtual(input.parse_u16()?);
    0xb7 => INVOKESPECIAL, "invokespecial", InvokeSpecial(input.parse_u16()?);
    0xb8 => INVOKESTATIC, "invokestatic", InvokeStatic(input.parse_u16()?);
    0xbb => NEW, "new", New(input.parse_u16()?);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(code: &[u8]) -> Result<Vec<Instruction>, InstructionParseError> {
        let mut input = ByteParser::new(code);
        let mut out = vec![];
        while !input.is_empty() {
            out.push(parse_instruction(&mut input)?.instruction);
        }
        Ok(out)
    }

    #[test]
    fn test_operands() {
        let code = [
            BIPUSH, 0xff, // -1
            SIPUSH, 0x80, 0x00, // i16::MIN
            IINC, 0x02, 0xfe, // local 2 += -2
            GOTO, 0xff, 0xf6, // -10
            INVOKESTATIC, 0x01, 0x02,
        ];
        assert_eq!(
            parse_all(&code),
            Ok(vec![
                Instruction::PushByte(-1),
                Instruction::PushShort(i16::MIN),
                Instruction::IncInt(2, -2),
                Instruction::Goto(-10),
                Instruction::InvokeStatic(0x0102),
            ])
        );
    }

    #[test]
    fn test_entry_offsets() {
        let mut input = ByteParser::new(&[ICONST_1, IFNE, 0x00, 0x03, RETURN]);
        let offsets = (0..3)
            .map(|_| parse_instruction(&mut input).unwrap().start)
            .collect::<Vec<_>>();
        assert_eq!(offsets, vec![0, 1, 4]);
    }

    #[test]
    fn test_unknown_and_truncated() {
        // lconst_0 is outside the supported set
        assert_eq!(parse_all(&[0x09]), Err(InstructionParseError::UnknownOpcode(0x09)));
        assert_eq!(parse_all(&[SIPUSH, 0x01]), Err(InstructionParseError::Truncated));
    }

    #[test]
    fn test_names() {
        assert_eq!(instruction_name(IF_ICMPGE), Some("if_icmpge"));
        assert_eq!(instruction_name(0xfe), None);
    }
}
