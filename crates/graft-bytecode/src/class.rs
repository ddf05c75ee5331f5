//! Class-file container format
//!
//! A `.gbc` file holds one compiled class: header, access flags, attributes,
//! field table, and method table. Method bodies are stored in structured
//! instruction-list form (see [`crate::insn`]) together with their exception
//! ranges and debug records.

use crate::encoder::{ByteReader, ByteWriter, DecodeError};
use crate::insn::{ConstValue, Insn, LabelId};
use thiserror::Error;

/// Magic number for graft class files: "GBCF"
pub const MAGIC: [u8; 4] = *b"GBCF";

/// Current class format version
pub const VERSION: u32 = 1;

/// File extension for compiled classes inside archive containers
pub const CLASS_EXT: &str = "gbc";

/// Access and property flags
pub mod access {
    /// Publicly accessible
    pub const PUBLIC: u32 = 1 << 0;
    /// Accessible only within the declaring class
    pub const PRIVATE: u32 = 1 << 1;
    /// Accessible within the package and subclasses
    pub const PROTECTED: u32 = 1 << 2;
    /// Class-level member
    pub const STATIC: u32 = 1 << 3;
    /// Not assignable / not overridable
    pub const FINAL: u32 = 1 << 4;
    /// Abstract class or bodiless method
    pub const ABSTRACT: u32 = 1 << 5;
    /// Interface type
    pub const INTERFACE: u32 = 1 << 6;
    /// Enum type
    pub const ENUM: u32 = 1 << 7;
    /// Annotation type
    pub const ANNOTATION: u32 = 1 << 8;
    /// Compiler-generated member
    pub const SYNTHETIC: u32 = 1 << 9;
}

/// Class encoding/decoding errors
#[derive(Debug, Error)]
pub enum ClassError {
    /// Decode error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Invalid magic number
    #[error("Invalid magic number: expected GBCF, got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Unsupported version
    #[error("Unsupported version: {0} (current: {VERSION})")]
    UnsupportedVersion(u32),

    /// Checksum mismatch
    #[error("Checksum mismatch: expected {expected:#x}, got {actual:#x}")]
    ChecksumMismatch {
        /// Checksum stored in the header
        expected: u32,
        /// Checksum computed over the payload
        actual: u32,
    },
}

/// Named string attribute attached to a class, field, or method
///
/// Attributes carry out-of-band metadata the runtime ignores; the weaving
/// engine uses them for its member markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name, e.g. `mixin.target`
    pub name: String,
    /// Attribute payload; empty for pure markers
    pub data: String,
}

impl Attribute {
    /// Create a new attribute
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    fn encode(&self, writer: &mut ByteWriter) {
        writer.emit_str(&self.name);
        writer.emit_str(&self.data);
    }

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let name = reader.read_str()?;
        let data = reader.read_str()?;
        Ok(Self { name, data })
    }
}

fn encode_attrs(attrs: &[Attribute], writer: &mut ByteWriter) {
    writer.emit_u32(attrs.len() as u32);
    for attr in attrs {
        attr.encode(writer);
    }
}

fn decode_attrs(reader: &mut ByteReader<'_>) -> Result<Vec<Attribute>, DecodeError> {
    let count = reader.read_u32()? as usize;
    let mut attrs = Vec::with_capacity(count);
    for _ in 0..count {
        attrs.push(Attribute::decode(reader)?);
    }
    Ok(attrs)
}

fn find_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|attr| attr.name == name)
        .map(|attr| attr.data.as_str())
}

/// Exception range covering a span of labeled instructions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryCatch {
    /// Start of the protected range (inclusive)
    pub start: LabelId,
    /// End of the protected range (exclusive)
    pub end: LabelId,
    /// Handler entry point
    pub handler: LabelId,
    /// Exception type name; `None` catches everything
    pub exception: Option<String>,
}

impl TryCatch {
    fn encode(&self, writer: &mut ByteWriter) {
        writer.emit_u32(self.start.0);
        writer.emit_u32(self.end.0);
        writer.emit_u32(self.handler.0);
        match &self.exception {
            Some(name) => {
                writer.emit_u8(1);
                writer.emit_str(name);
            }
            None => writer.emit_u8(0),
        }
    }

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let start = LabelId(reader.read_u32()?);
        let end = LabelId(reader.read_u32()?);
        let handler = LabelId(reader.read_u32()?);
        let exception = if reader.read_u8()? != 0 {
            Some(reader.read_str()?)
        } else {
            None
        };
        Ok(Self {
            start,
            end,
            handler,
            exception,
        })
    }

    /// Clone this range with every label token shifted by `offset`
    pub fn rebase_labels(&self, offset: u32) -> Self {
        Self {
            start: self.start.rebase(offset),
            end: self.end.rebase(offset),
            handler: self.handler.rebase(offset),
            exception: self.exception.clone(),
        }
    }
}

/// Debug record describing a named local variable over a labeled range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVarRecord {
    /// Source-level variable name
    pub name: String,
    /// Variable type descriptor
    pub descriptor: String,
    /// Local slot holding the variable
    pub slot: u16,
    /// Start of validity range
    pub start: LabelId,
    /// End of validity range
    pub end: LabelId,
}

impl LocalVarRecord {
    fn encode(&self, writer: &mut ByteWriter) {
        writer.emit_str(&self.name);
        writer.emit_str(&self.descriptor);
        writer.emit_u16(self.slot);
        writer.emit_u32(self.start.0);
        writer.emit_u32(self.end.0);
    }

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let name = reader.read_str()?;
        let descriptor = reader.read_str()?;
        let slot = reader.read_u16()?;
        let start = LabelId(reader.read_u32()?);
        let end = LabelId(reader.read_u32()?);
        Ok(Self {
            name,
            descriptor,
            slot,
            start,
            end,
        })
    }

    /// Clone this record with every label token shifted by `offset`
    pub fn rebase_labels(&self, offset: u32) -> Self {
        Self {
            start: self.start.rebase(offset),
            end: self.end.rebase(offset),
            ..self.clone()
        }
    }
}

/// Debug record mapping a label to a source line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord {
    /// Source line number
    pub line: u32,
    /// Label the line starts at
    pub start: LabelId,
}

impl LineRecord {
    fn encode(&self, writer: &mut ByteWriter) {
        writer.emit_u32(self.line);
        writer.emit_u32(self.start.0);
    }

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let line = reader.read_u32()?;
        let start = LabelId(reader.read_u32()?);
        Ok(Self { line, start })
    }

    /// Clone this record with the label token shifted by `offset`
    pub fn rebase_labels(&self, offset: u32) -> Self {
        Self {
            line: self.line,
            start: self.start.rebase(offset),
        }
    }
}

/// Code and bookkeeping of a concrete method
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodBody {
    /// Operand stack slots required
    pub max_stack: u16,
    /// Local variable slots required (parameters included)
    pub max_locals: u16,
    /// Size of the label token arena; all label tokens are below this
    pub label_count: u32,
    /// Instruction list
    pub code: Vec<Insn>,
    /// Exception ranges
    pub try_catches: Vec<TryCatch>,
    /// Local variable debug records
    pub local_vars: Vec<LocalVarRecord>,
    /// Line number debug records
    pub lines: Vec<LineRecord>,
}

impl MethodBody {
    /// Create an empty body
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh label token in this body's arena
    pub fn fresh_label(&mut self) -> LabelId {
        let label = LabelId(self.label_count);
        self.label_count += 1;
        label
    }

    fn encode(&self, writer: &mut ByteWriter) {
        writer.emit_u16(self.max_stack);
        writer.emit_u16(self.max_locals);
        writer.emit_u32(self.label_count);

        writer.emit_u32(self.code.len() as u32);
        for insn in &self.code {
            insn.encode(writer);
        }

        writer.emit_u32(self.try_catches.len() as u32);
        for tc in &self.try_catches {
            tc.encode(writer);
        }

        writer.emit_u32(self.local_vars.len() as u32);
        for lv in &self.local_vars {
            lv.encode(writer);
        }

        writer.emit_u32(self.lines.len() as u32);
        for line in &self.lines {
            line.encode(writer);
        }
    }

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let max_stack = reader.read_u16()?;
        let max_locals = reader.read_u16()?;
        let label_count = reader.read_u32()?;

        let code_len = reader.read_u32()? as usize;
        let mut code = Vec::with_capacity(code_len);
        for _ in 0..code_len {
            code.push(Insn::decode(reader)?);
        }

        let tc_len = reader.read_u32()? as usize;
        let mut try_catches = Vec::with_capacity(tc_len);
        for _ in 0..tc_len {
            try_catches.push(TryCatch::decode(reader)?);
        }

        let lv_len = reader.read_u32()? as usize;
        let mut local_vars = Vec::with_capacity(lv_len);
        for _ in 0..lv_len {
            local_vars.push(LocalVarRecord::decode(reader)?);
        }

        let line_len = reader.read_u32()? as usize;
        let mut lines = Vec::with_capacity(line_len);
        for _ in 0..line_len {
            lines.push(LineRecord::decode(reader)?);
        }

        Ok(Self {
            max_stack,
            max_locals,
            label_count,
            code,
            try_catches,
            local_vars,
            lines,
        })
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Access flags
    pub access: u32,
    /// Field name
    pub name: String,
    /// Type descriptor
    pub descriptor: String,
    /// Constant initializer for static-final fields
    pub constant: Option<ConstValue>,
    /// Field attributes
    pub attrs: Vec<Attribute>,
}

impl FieldDef {
    /// Create a field with no constant and no attributes
    pub fn new(access: u32, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            access,
            name: name.into(),
            descriptor: descriptor.into(),
            constant: None,
            attrs: Vec::new(),
        }
    }

    /// Whether the field is static
    pub fn is_static(&self) -> bool {
        self.access & access::STATIC != 0
    }

    /// Whether the field is final
    pub fn is_final(&self) -> bool {
        self.access & access::FINAL != 0
    }

    /// Whether the field carries an attribute with the given name
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Look up an attribute payload by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        find_attr(&self.attrs, name)
    }

    fn encode(&self, writer: &mut ByteWriter) {
        writer.emit_u32(self.access);
        writer.emit_str(&self.name);
        writer.emit_str(&self.descriptor);
        match &self.constant {
            Some(value) => {
                writer.emit_u8(1);
                value.encode(writer);
            }
            None => writer.emit_u8(0),
        }
        encode_attrs(&self.attrs, writer);
    }

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let access = reader.read_u32()?;
        let name = reader.read_str()?;
        let descriptor = reader.read_str()?;
        let constant = if reader.read_u8()? != 0 {
            Some(ConstValue::decode(reader)?)
        } else {
            None
        };
        let attrs = decode_attrs(reader)?;
        Ok(Self {
            access,
            name,
            descriptor,
            constant,
            attrs,
        })
    }
}

/// Method definition
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    /// Access flags
    pub access: u32,
    /// Method name
    pub name: String,
    /// Method descriptor
    pub descriptor: String,
    /// Method attributes
    pub attrs: Vec<Attribute>,
    /// Body; absent for abstract methods
    pub body: Option<MethodBody>,
}

impl MethodDef {
    /// Create a concrete method with an empty body
    pub fn new(access: u32, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            access,
            name: name.into(),
            descriptor: descriptor.into(),
            attrs: Vec::new(),
            body: Some(MethodBody::new()),
        }
    }

    /// Create an abstract method
    pub fn new_abstract(
        access: u32,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            access: access | access::ABSTRACT,
            name: name.into(),
            descriptor: descriptor.into(),
            attrs: Vec::new(),
            body: None,
        }
    }

    /// Whether the method is static
    pub fn is_static(&self) -> bool {
        self.access & access::STATIC != 0
    }

    /// Whether the method is abstract
    pub fn is_abstract(&self) -> bool {
        self.access & access::ABSTRACT != 0
    }

    /// Whether the method carries an attribute with the given name
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Look up an attribute payload by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        find_attr(&self.attrs, name)
    }

    fn encode(&self, writer: &mut ByteWriter) {
        writer.emit_u32(self.access);
        writer.emit_str(&self.name);
        writer.emit_str(&self.descriptor);
        encode_attrs(&self.attrs, writer);
        match &self.body {
            Some(body) => {
                writer.emit_u8(1);
                body.encode(writer);
            }
            None => writer.emit_u8(0),
        }
    }

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let access = reader.read_u32()?;
        let name = reader.read_str()?;
        let descriptor = reader.read_str()?;
        let attrs = decode_attrs(reader)?;
        let body = if reader.read_u8()? != 0 {
            Some(MethodBody::decode(reader)?)
        } else {
            None
        };
        Ok(Self {
            access,
            name,
            descriptor,
            attrs,
            body,
        })
    }
}

/// A compiled class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    /// Magic number (must be "GBCF")
    pub magic: [u8; 4],
    /// Class format version
    pub version: u32,
    /// File flags (reserved)
    pub flags: u32,
    /// Class access flags
    pub access: u32,
    /// Class name (dotted)
    pub name: String,
    /// Superclass name (dotted)
    pub super_name: String,
    /// Class attributes
    pub attrs: Vec<Attribute>,
    /// Field table
    pub fields: Vec<FieldDef>,
    /// Method table
    pub methods: Vec<MethodDef>,
}

impl ClassFile {
    /// Create a new public class extending `lang.Object`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            flags: 0,
            access: access::PUBLIC,
            name: name.into(),
            super_name: "lang.Object".to_string(),
            attrs: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Whether the class is abstract
    pub fn is_abstract(&self) -> bool {
        self.access & access::ABSTRACT != 0
    }

    /// Whether the class is an interface
    pub fn is_interface(&self) -> bool {
        self.access & access::INTERFACE != 0
    }

    /// Whether the class is an enum
    pub fn is_enum(&self) -> bool {
        self.access & access::ENUM != 0
    }

    /// Whether the class is an annotation
    pub fn is_annotation(&self) -> bool {
        self.access & access::ANNOTATION != 0
    }

    /// Look up a class attribute payload by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        find_attr(&self.attrs, name)
    }

    /// Look up a field by name and descriptor
    pub fn field(&self, name: &str, descriptor: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|f| f.name == name && f.descriptor == descriptor)
    }

    /// Look up a method by name and descriptor
    pub fn method(&self, name: &str, descriptor: &str) -> Option<&MethodDef> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }

    /// Encode the class to binary format (.gbc)
    ///
    /// Format:
    /// - Header: magic (4 bytes) + version (u32) + flags (u32) + checksum (u32)
    /// - Access flags, name, super name
    /// - Class attributes
    /// - Field table
    /// - Method table
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();

        writer.emit_bytes(&self.magic);
        writer.emit_u32(self.version);
        writer.emit_u32(self.flags);
        let checksum_offset = writer.reserve_u32();

        writer.emit_u32(self.access);
        writer.emit_str(&self.name);
        writer.emit_str(&self.super_name);
        encode_attrs(&self.attrs, &mut writer);

        writer.emit_u32(self.fields.len() as u32);
        for field in &self.fields {
            field.encode(&mut writer);
        }

        writer.emit_u32(self.methods.len() as u32);
        for method in &self.methods {
            method.encode(&mut writer);
        }

        // Checksum everything after the 16-byte header.
        let checksum = crc32fast::hash(&writer.buffer()[16..]);
        writer.patch_u32(checksum_offset, checksum);

        writer.into_bytes()
    }

    /// Decode a class from binary format
    pub fn decode(data: &[u8]) -> Result<Self, ClassError> {
        let mut reader = ByteReader::new(data);

        let magic_bytes = reader.read_bytes(4)?;
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&magic_bytes);
        if magic != MAGIC {
            return Err(ClassError::InvalidMagic(magic));
        }

        let version = reader.read_u32()?;
        if version != VERSION {
            return Err(ClassError::UnsupportedVersion(version));
        }

        let flags = reader.read_u32()?;
        let stored_checksum = reader.read_u32()?;

        let actual_checksum = crc32fast::hash(&data[16..]);
        if stored_checksum != actual_checksum {
            return Err(ClassError::ChecksumMismatch {
                expected: stored_checksum,
                actual: actual_checksum,
            });
        }

        let access = reader.read_u32()?;
        let name = reader.read_str()?;
        let super_name = reader.read_str()?;
        let attrs = decode_attrs(&mut reader)?;

        let field_count = reader.read_u32()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            fields.push(FieldDef::decode(&mut reader)?);
        }

        let method_count = reader.read_u32()? as usize;
        let mut methods = Vec::with_capacity(method_count);
        for _ in 0..method_count {
            methods.push(MethodDef::decode(&mut reader)?);
        }

        Ok(Self {
            magic,
            version,
            flags,
            access,
            name,
            super_name,
            attrs,
            fields,
            methods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insn::MemberRef;
    use crate::opcode::Opcode;

    fn sample_class() -> ClassFile {
        let mut class = ClassFile::new("demo.Vector");

        class.fields.push(FieldDef::new(access::PRIVATE, "x", "D"));
        class.fields.push(FieldDef::new(access::PRIVATE, "y", "D"));

        let mut body = MethodBody::new();
        body.max_stack = 2;
        body.max_locals = 1;
        body.code = vec![
            Insn::Var(Opcode::LoadLocal, 0),
            Insn::Field(Opcode::GetField, MemberRef::new("demo.Vector", "x", "D")),
            Insn::Simple(Opcode::Return),
        ];
        let mut method = MethodDef::new(access::PUBLIC, "getX", "()D");
        method.body = Some(body);
        class.methods.push(method);

        class
    }

    #[test]
    fn test_class_creation() {
        let class = ClassFile::new("demo.Vector");
        assert_eq!(class.magic, MAGIC);
        assert_eq!(class.version, VERSION);
        assert_eq!(class.super_name, "lang.Object");
        assert!(!class.is_abstract());
    }

    #[test]
    fn test_roundtrip() {
        let class = sample_class();
        let bytes = class.encode();
        let decoded = ClassFile::decode(&bytes).unwrap();
        assert_eq!(decoded, class);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let class = sample_class();
        assert_eq!(class.encode(), class.encode());
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = sample_class().encode();
        bytes[0] = b'X';
        assert!(matches!(
            ClassFile::decode(&bytes),
            Err(ClassError::InvalidMagic(_))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = sample_class().encode();
        bytes[4..8].copy_from_slice(&999u32.to_le_bytes());
        assert!(matches!(
            ClassFile::decode(&bytes),
            Err(ClassError::UnsupportedVersion(999))
        ));
    }

    #[test]
    fn test_checksum_validation() {
        let mut bytes = sample_class().encode();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(
            ClassFile::decode(&bytes),
            Err(ClassError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_constant_field() {
        let mut class = ClassFile::new("demo.Config");
        let mut field = FieldDef::new(access::STATIC | access::FINAL, "ANSWER", "I");
        field.constant = Some(ConstValue::I32(42));
        class.fields.push(field);

        let decoded = ClassFile::decode(&class.encode()).unwrap();
        assert_eq!(
            decoded.field("ANSWER", "I").unwrap().constant,
            Some(ConstValue::I32(42))
        );
    }

    #[test]
    fn test_abstract_method_has_no_body() {
        let mut class = ClassFile::new("demo.Shape");
        class.access |= access::ABSTRACT;
        class
            .methods
            .push(MethodDef::new_abstract(access::PUBLIC, "area", "()D"));

        let decoded = ClassFile::decode(&class.encode()).unwrap();
        let method = decoded.method("area", "()D").unwrap();
        assert!(method.is_abstract());
        assert!(method.body.is_none());
    }

    #[test]
    fn test_attributes() {
        let mut class = ClassFile::new("demo.VectorMixin");
        class.access |= access::ABSTRACT;
        class
            .attrs
            .push(Attribute::new("mixin.target", "demo.Vector"));

        let mut field = FieldDef::new(access::PRIVATE, "x", "D");
        field.attrs.push(Attribute::new("mixin.shadow", ""));
        class.fields.push(field);

        let decoded = ClassFile::decode(&class.encode()).unwrap();
        assert_eq!(decoded.attr("mixin.target"), Some("demo.Vector"));
        assert_eq!(decoded.attr("mixin.unknown"), None);
        assert!(decoded.field("x", "D").unwrap().has_attr("mixin.shadow"));
    }

    #[test]
    fn test_body_with_exception_range() {
        let mut class = ClassFile::new("demo.Guarded");
        let mut body = MethodBody::new();
        let start = body.fresh_label();
        let end = body.fresh_label();
        let handler = body.fresh_label();
        body.code = vec![
            Insn::Label(start),
            Insn::Simple(Opcode::Nop),
            Insn::Label(end),
            Insn::Simple(Opcode::ReturnVoid),
            Insn::Label(handler),
            Insn::Simple(Opcode::Throw),
        ];
        body.try_catches.push(TryCatch {
            start,
            end,
            handler,
            exception: Some("lang.Error".to_string()),
        });
        body.lines.push(LineRecord { line: 10, start });
        body.local_vars.push(LocalVarRecord {
            name: "tmp".to_string(),
            descriptor: "I".to_string(),
            slot: 1,
            start,
            end,
        });
        let mut method = MethodDef::new(access::PUBLIC, "run", "()V");
        method.body = Some(body);
        class.methods.push(method);

        let decoded = ClassFile::decode(&class.encode()).unwrap();
        let body = decoded.method("run", "()V").unwrap().body.as_ref().unwrap();
        assert_eq!(body.try_catches.len(), 1);
        assert_eq!(body.try_catches[0].exception.as_deref(), Some("lang.Error"));
        assert_eq!(body.lines[0].line, 10);
        assert_eq!(body.local_vars[0].name, "tmp");
        assert_eq!(body.label_count, 3);
    }

    #[test]
    fn test_fresh_label_allocation() {
        let mut body = MethodBody::new();
        assert_eq!(body.fresh_label(), LabelId(0));
        assert_eq!(body.fresh_label(), LabelId(1));
        assert_eq!(body.label_count, 2);
    }
}
