//! Thin adapter over the `jclassfile` constant-pool/structure parser,
//! grounded on the constant-pool walk already present in `scan.rs`
//! (`resolve_class_name`, `resolve_utf8`, `ConstantPool::{Class, Utf8}`),
//! extended to resolve `Methodref`/`InterfaceMethodref` entries and to
//! extract call sites from each method's Code attribute.
//!
//! `loader.rs` consumes [`RawClass`] to build `ir::ClassDecl`; this module
//! owns every direct dependency on the `jclassfile` crate so that surface
//! stays in one place.

use anyhow::{Context, Result};
use jclassfile::class_file;
use jclassfile::constant_pool::ConstantPool;

use crate::ir::{CallKind, CallSite, MethodRef};
use crate::opcodes;

pub(crate) const ACC_PUBLIC: u16 = 0x0001;
pub(crate) const ACC_PRIVATE: u16 = 0x0002;
pub(crate) const ACC_PROTECTED: u16 = 0x0004;
pub(crate) const ACC_STATIC: u16 = 0x0008;
pub(crate) const ACC_INTERFACE: u16 = 0x0200;
pub(crate) const ACC_ABSTRACT: u16 = 0x0400;
pub(crate) const ACC_SYNTHETIC: u16 = 0x1000;

/// A loaded class file, trimmed to what the loader needs: its slash-form
/// name, superclass, directly implemented interfaces, access flags, and
/// methods (each with its call sites already extracted from the Code
/// attribute, empty for abstract/native methods).
pub(crate) struct RawClass {
    pub(crate) name: String,
    pub(crate) access_flags: u16,
    pub(crate) super_name: Option<String>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) methods: Vec<RawMethod>,
}

pub(crate) struct RawMethod {
    pub(crate) name: String,
    pub(crate) descriptor: String,
    pub(crate) access_flags: u16,
    pub(crate) call_sites: Vec<CallSite>,
}

pub(crate) fn parse(data: &[u8]) -> Result<RawClass> {
    let parsed = class_file::parse(data).context("failed to parse class file bytes")?;
    let constant_pool = parsed.constant_pool();

    let name = resolve_class_name(constant_pool, parsed.this_class())
        .context("resolve this_class name")?;
    let super_name = match parsed.super_class() {
        0 => None,
        index => {
            Some(resolve_class_name(constant_pool, index).context("resolve super_class name")?)
        }
    };
    let interfaces = parsed
        .interfaces()
        .iter()
        .map(|&index| resolve_class_name(constant_pool, index))
        .collect::<Result<Vec<_>>>()
        .context("resolve directly implemented interfaces")?;

    let methods = parsed
        .methods()
        .iter()
        .map(|method| {
            let name =
                resolve_utf8(constant_pool, method.name_index()).context("resolve method name")?;
            let descriptor = resolve_utf8(constant_pool, method.descriptor_index())
                .context("resolve method descriptor")?;
            let call_sites = match method.code() {
                Some(code) => extract_call_sites(constant_pool, code)
                    .with_context(|| format!("extract call sites for {name}{descriptor}"))?,
                None => Vec::new(),
            };
            Ok(RawMethod {
                name,
                descriptor,
                access_flags: method.access_flags(),
                call_sites,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RawClass {
        name,
        access_flags: parsed.access_flags(),
        super_name,
        interfaces,
        methods,
    })
}

/// Linear scan over a method's Code attribute bytes, recognizing the four
/// invoke opcodes (spec.md §3's `CallSite.kind`) and skipping every other
/// instruction by its encoded length. No control-flow graph is built —
/// spec.md bounds bytecode modeling to call-site enumeration only; RTA's
/// instantiated-type evidence comes from constructor reachability in the
/// call-graph constructor, not from scanning for `new` here.
fn extract_call_sites(constant_pool: &[ConstantPool], code: &[u8]) -> Result<Vec<CallSite>> {
    let mut call_sites = Vec::new();
    let mut offset = 0usize;
    while offset < code.len() {
        let opcode = code[offset];
        if let Some(kind) = invoke_kind(opcode) {
            let index = read_u16(code, offset + 1)?;
            let declared_target = resolve_method_ref(constant_pool, index)
                .with_context(|| format!("resolve invoke target at offset {offset}"))?;
            call_sites.push(CallSite {
                kind,
                declared_target,
                bytecode_offset: offset as u32,
            });
        }
        offset += opcodes::opcode_length(code, offset)
            .with_context(|| format!("compute instruction length at offset {offset}"))?;
    }
    Ok(call_sites)
}

fn invoke_kind(opcode: u8) -> Option<CallKind> {
    match opcode {
        opcodes::INVOKEVIRTUAL => Some(CallKind::Virtual),
        opcodes::INVOKESPECIAL => Some(CallKind::Special),
        opcodes::INVOKESTATIC => Some(CallKind::Static),
        opcodes::INVOKEINTERFACE => Some(CallKind::Interface),
        _ => None,
    }
}

fn resolve_method_ref(constant_pool: &[ConstantPool], index: u16) -> Result<MethodRef> {
    let entry = constant_pool
        .get(index as usize)
        .context("missing methodref entry")?;
    let (class_index, name_and_type_index) = match entry {
        ConstantPool::Methodref {
            class_index,
            name_and_type_index,
        }
        | ConstantPool::InterfaceMethodref {
            class_index,
            name_and_type_index,
        } => (*class_index, *name_and_type_index),
        _ => anyhow::bail!("constant pool entry {index} is not a method reference"),
    };
    let owner_fqn = resolve_class_name(constant_pool, class_index)?;
    let (name, descriptor) = resolve_name_and_type(constant_pool, name_and_type_index)?;
    Ok(MethodRef {
        owner_fqn,
        name,
        descriptor,
    })
}

fn resolve_name_and_type(constant_pool: &[ConstantPool], index: u16) -> Result<(String, String)> {
    let entry = constant_pool
        .get(index as usize)
        .context("missing name_and_type entry")?;
    match entry {
        ConstantPool::NameAndType {
            name_index,
            descriptor_index,
        } => Ok((
            resolve_utf8(constant_pool, *name_index)?,
            resolve_utf8(constant_pool, *descriptor_index)?,
        )),
        _ => anyhow::bail!("constant pool entry {index} is not a NameAndType entry"),
    }
}

fn resolve_class_name(constant_pool: &[ConstantPool], class_index: u16) -> Result<String> {
    let entry = constant_pool
        .get(class_index as usize)
        .context("missing class entry")?;
    match entry {
        ConstantPool::Class { name_index } => resolve_utf8(constant_pool, *name_index),
        _ => anyhow::bail!("constant pool entry {class_index} is not a Class entry"),
    }
}

fn resolve_utf8(constant_pool: &[ConstantPool], index: u16) -> Result<String> {
    let entry = constant_pool
        .get(index as usize)
        .context("missing utf8 entry")?;
    match entry {
        ConstantPool::Utf8 { value } => Ok(value.clone()),
        _ => anyhow::bail!("constant pool entry {index} is not a Utf8 entry"),
    }
}

fn read_u16(code: &[u8], offset: usize) -> Result<u16> {
    let bytes: [u8; 2] = code
        .get(offset..offset + 2)
        .context("truncated instruction operand")?
        .try_into()
        .expect("slice of length 2");
    Ok(u16::from_be_bytes(bytes))
}
