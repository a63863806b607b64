//! Coloured listing of a class: header, constant pool, fields, and methods
//! with their disassembled code.

use crate::style;
use class::{
    attribute::Code,
    class::Class,
    constant::{Constant, ConstantKind, ConstantPool, PoolIndex},
    parse::ByteParser,
    parse_mutf8, ClassResult,
};
use vm::opcode::{instruction_name, parse_instruction, Instruction};

fn comment(text: &str) -> String {
    style::get("comment").paint(format!("// {}", text)).to_string()
}

fn index(index: PoolIndex) -> String {
    style::get("pool.index").paint(format!("#{}", index)).to_string()
}

fn utf8_or_placeholder(pool: &ConstantPool, at: PoolIndex) -> String {
    match pool.utf8_str(at) {
        Ok(text) => text.into_owned(),
        Err(err) => format!("<{}>", err),
    }
}

fn member_or_placeholder(pool: &ConstantPool, at: PoolIndex, kind: ConstantKind) -> String {
    match pool.member_ref(at, kind) {
        Ok(member) => member.to_string(),
        Err(err) => format!("<{}>", err),
    }
}

fn kind_style(kind: ConstantKind) -> &'static str {
    match kind {
        ConstantKind::Utf8 => "pool.val.utf8",
        ConstantKind::Integer => "pool.val.int",
        ConstantKind::Class => "pool.ref.class",
        ConstantKind::String => "pool.ref.string",
        ConstantKind::FieldRef | ConstantKind::MethodRef | ConstantKind::InterfaceMethodRef => {
            "pool.ref.member"
        }
        ConstantKind::NameAndType => "pool.ref.name_and_type",
        ConstantKind::MethodHandle | ConstantKind::MethodType | ConstantKind::InvokeDynamic => {
            "pool.ref.dynamic"
        }
    }
}

/// One line of the constant pool listing, without the leading index.
pub fn describe_constant(pool: &ConstantPool, at: PoolIndex, constant: &Constant) -> String {
    let kind = constant.kind();
    let name = style::get(kind_style(kind)).paint(format!("{:<18}", kind.to_string()));

    let body = match *constant {
        Constant::Utf8(ref bytes) => match parse_mutf8(bytes) {
            Ok(text) => format!("{:?}", text),
            Err(err) => format!("<{}>", err),
        },
        Constant::Integer(value) => value.to_string(),
        Constant::Class(name) | Constant::String(name) | Constant::MethodType(name) => {
            format!("{} {}", index(name), comment(&utf8_or_placeholder(pool, name)))
        }
        Constant::FieldRef {
            class,
            name_and_type,
        }
        | Constant::MethodRef {
            class,
            name_and_type,
        }
        | Constant::InterfaceMethodRef {
            class,
            name_and_type,
        } => format!(
            "{}.{} {}",
            index(class),
            index(name_and_type),
            comment(&member_or_placeholder(pool, at, kind))
        ),
        Constant::NameAndType { name, descriptor } => format!(
            "{}:{} {}",
            index(name),
            index(descriptor),
            comment(&format!(
                "{}:{}",
                utf8_or_placeholder(pool, name),
                utf8_or_placeholder(pool, descriptor)
            ))
        ),
        Constant::MethodHandle {
            kind: handle_kind,
            index: handle,
        } => format!("{}:{}", handle_kind, index(handle)),
        Constant::InvokeDynamic {
            bootstrap_method_attr,
            name_and_type,
        } => format!("{}:{}", bootstrap_method_attr, index(name_and_type)),
    };

    format!("{} {}", name, body)
}

fn describe_operands(pool: &ConstantPool, start: usize, instruction: Instruction) -> String {
    let branch = |offset: i16| {
        let target = start as isize + offset as isize;
        style::get("opcode.immediate").paint(format!("-> {}", target)).to_string()
    };
    let field = |at: u16| {
        format!(
            "{} {}",
            index(at as usize),
            comment(&member_or_placeholder(pool, at as usize, ConstantKind::FieldRef))
        )
    };
    let method = |at: u16| {
        format!(
            "{} {}",
            index(at as usize),
            comment(&member_or_placeholder(pool, at as usize, ConstantKind::MethodRef))
        )
    };
    let immediate = |value: String| style::get("opcode.immediate").paint(value).to_string();

    match instruction {
        Instruction::PushByte(value) => immediate(value.to_string()),
        Instruction::PushShort(value) => immediate(value.to_string()),
        Instruction::LoadConstant(at) => match pool.get(at as usize) {
            Ok(constant) => format!("{} {}", index(at as usize), comment(&constant_value(pool, constant))),
            Err(err) => format!("{} {}", index(at as usize), comment(&err.to_string())),
        },
        Instruction::LoadInt(local)
        | Instruction::LoadRef(local)
        | Instruction::StoreInt(local)
        | Instruction::StoreRef(local) => immediate(local.to_string()),
        Instruction::IncInt(local, delta) => immediate(format!("{} {}", local, delta)),
        Instruction::IfNotZero(offset)
        | Instruction::IfNotEqualInt(offset)
        | Instruction::IfGreaterEqualInt(offset)
        | Instruction::Goto(offset) => branch(offset),
        Instruction::GetStatic(at) | Instruction::GetField(at) | Instruction::PutField(at) => {
            field(at)
        }
        Instruction::InvokeVirtual(at)
        | Instruction::InvokeSpecial(at)
        | Instruction::InvokeStatic(at) => method(at),
        Instruction::New(at) => match pool.class_name(at as usize) {
            Ok(name) => format!("{} {}", index(at as usize), comment(&name)),
            Err(err) => format!("{} {}", index(at as usize), comment(&err.to_string())),
        },
        _ => String::new(),
    }
}

fn constant_value(pool: &ConstantPool, constant: &Constant) -> String {
    match *constant {
        Constant::Integer(value) => value.to_string(),
        Constant::String(text) => format!("{:?}", utf8_or_placeholder(pool, text)),
        ref other => other.kind().to_string(),
    }
}

fn opcode_style(instruction: Instruction) -> &'static str {
    match instruction {
        Instruction::InvokeVirtual(_) | Instruction::InvokeSpecial(_) | Instruction::InvokeStatic(_) => {
            "opcode.flow.invocation"
        }
        Instruction::IfNotZero(_)
        | Instruction::IfNotEqualInt(_)
        | Instruction::IfGreaterEqualInt(_)
        | Instruction::Goto(_)
        | Instruction::ReturnInt
        | Instruction::ReturnRef
        | Instruction::Return => "opcode.flow",
        _ => "opcode",
    }
}

/// Lists the instructions in `code`. Listing stops at the first byte that is
/// not a supported opcode.
pub fn disassemble(pool: &ConstantPool, code: &Code) -> Vec<String> {
    let mut input = ByteParser::new(&code.code);
    let mut lines = Vec::new();

    while !input.is_empty() {
        let start = input.offset;
        match parse_instruction(&mut input) {
            Ok(entry) => {
                let name = instruction_name(entry.tag).unwrap_or("???");
                lines.push(format!(
                    "{:>5}: {} {}",
                    start,
                    style::get(opcode_style(entry.instruction)).paint(format!("{:<14}", name)),
                    describe_operands(pool, start, entry.instruction)
                ).trim_end().to_string());
            }
            Err(err) => {
                lines.push(format!("{:>5}: {}", start, comment(&format!("{:?}", err))));
                break;
            }
        }
    }

    lines
}

pub fn dump_class(class: &Class) -> ClassResult<String> {
    let pool = &class.pool;
    let mut out = Vec::new();

    out.push(comment(&format!("Version {}.{}", class.version.major, class.version.minor)));
    out.push(format!(
        "{} class {} {} {}",
        style::get("access").paint(class.access.to_string()),
        style::get("type.object").paint(class.name()?.into_owned()),
        style::get("extends").paint("extends"),
        style::get("type.object").paint(pool.class_name(class.super_class)?.into_owned()),
    ));

    out.push(String::new());
    out.push(style::get("heading").paint("Constant pool:").to_string());
    for (at, constant) in pool.iter() {
        out.push(format!(
            "  {} = {}",
            style::get("pool.index").paint(format!("{:>5}", format!("#{}", at))),
            describe_constant(pool, at, constant)
        ));
    }

    out.push(String::new());
    out.push(style::get("heading").paint("Fields:").to_string());
    for field in class.fields.iter() {
        out.push(format!(
            "  {} {} {}",
            style::get("access").paint(field.access.to_string()),
            style::get("type").paint(pool.utf8_str(field.descriptor)?.into_owned()),
            pool.utf8_str(field.name)?,
        ));
    }

    out.push(String::new());
    out.push(style::get("heading").paint("Methods:").to_string());
    for method in class.methods.iter() {
        let code = method.code(pool)?;
        let shape = match &code {
            Some(code) => format!(
                "{} args, max_stack {}, max_locals {}, {} bytes",
                method.arg_count(pool)?,
                code.max_stack,
                code.max_locals,
                code.code_length()
            ),
            None => "no code".to_string(),
        };
        out.push(format!(
            "  {} {}{} {}",
            style::get("access").paint(method.access.to_string()),
            class.method_name(method)?,
            style::get("type").paint(class.method_descriptor(method)?.into_owned()),
            comment(&shape),
        ));
        if let Some(code) = code {
            for line in disassemble(pool, &code) {
                out.push(format!("    {}", line));
            }
        }
    }

    let mut text = out.join("\n");
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use class::{access::AccessFlags, builder::ClassBuilder};
    use vm::opcode::*;

    fn sample() -> Class {
        let mut b = ClassBuilder::new("Sample");
        let out = b.field_ref("java/lang/System", "out", "Ljava/io/PrintStream;") as u8;
        let println = b.method_ref("java/io/PrintStream", "println", "(I)V") as u8;
        b.field(AccessFlags::PRIVATE, "count", "I");
        b.method(
            AccessFlags::PUBLIC | AccessFlags::STATIC,
            "main",
            "([Ljava/lang/String;)V",
            2,
            1,
            &[GETSTATIC, 0, out, BIPUSH, 7, INVOKEVIRTUAL, 0, println, GOTO, 0xff, 0xf8, 0xfe],
        );
        b.bodiless_method(AccessFlags::NATIVE, "hook", "()V");
        b.build()
    }

    #[test]
    fn test_disassemble() {
        let class = sample();
        let code = class.find_method("main").unwrap().unwrap().code(&class.pool).unwrap().unwrap();
        let lines = disassemble(&class.pool, &code);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("getstatic"));
        assert!(lines[0].contains("java/lang/System.out:Ljava/io/PrintStream;"));
        assert!(lines[2].contains("java/io/PrintStream.println:(I)V"));
        assert!(lines[3].contains("-> 0"));
        assert!(lines[4].contains("UnknownOpcode(254)"));
    }

    #[test]
    fn test_dump_class() {
        let text = dump_class(&sample()).unwrap();
        assert!(text.contains("Version 52.0"));
        assert!(text.contains("Constant pool:"));
        assert!(text.contains("\"java/lang/Object\""));
        assert!(text.contains("count"));
        assert!(text.contains("1 args, max_stack 2, max_locals 1, 12 bytes"));
        assert!(text.contains("no code"));
    }
}
