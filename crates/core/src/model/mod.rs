//! Core data model for instruction streams and corpus entities.
//!
//! The central contract here is `Instruction`: disassembler adapters live
//! outside this crate and hand us symbols as ordered instruction streams,
//! serialized as listing documents. Everything downstream (fingerprinting,
//! windowing, the index store) is defined over this one shape.

use serde::{Deserialize, Serialize};

/// A single disassembled machine instruction.
///
/// `opcode` and `arguments` are the rendered mnemonic and operand strings.
/// The optional fields carry relocation/branch metadata when the adapter
/// knows it: `branch_dest` for PC-relative targets, `symbol`/`addend` for
/// relocated references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: String,
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_dest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addend: Option<String>,
}

impl Instruction {
    pub fn new(opcode: impl Into<String>) -> Self {
        Self {
            opcode: opcode.into(),
            arguments: Vec::new(),
            address: None,
            branch_dest: None,
            symbol: None,
            addend: None,
        }
    }

    /// Builder-style helper for constructing instructions in adapters and tests.
    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_branch_dest(mut self, dest: impl Into<String>) -> Self {
        self.branch_dest = Some(dest.into());
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_addend(mut self, addend: impl Into<String>) -> Self {
        self.addend = Some(addend.into());
        self
    }
}

/// Target platform tag for a source.
///
/// Stored in the database as a small integer; parsed from the descriptor by
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    N64,
    Psx,
    Ps2,
    GcWii,
    Psp,
}

impl Platform {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "n64" => Some(Platform::N64),
            "psx" => Some(Platform::Psx),
            "ps2" => Some(Platform::Ps2),
            "gc_wii" => Some(Platform::GcWii),
            "psp" => Some(Platform::Psp),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::N64 => "n64",
            Platform::Psx => "psx",
            Platform::Ps2 => "ps2",
            Platform::GcWii => "gc_wii",
            Platform::Psp => "psp",
        }
    }

    /// The integer tag persisted in the database.
    pub fn to_i32(self) -> i32 {
        match self {
            Platform::N64 => 0,
            Platform::Psx => 1,
            Platform::Ps2 => 2,
            Platform::GcWii => 3,
            Platform::Psp => 4,
        }
    }

    /// Decode a persisted tag. Unknown tags are data errors, so this is an
    /// Option rather than a fallback.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Platform::N64),
            1 => Some(Platform::Psx),
            2 => Some(Platform::Ps2),
            3 => Some(Platform::GcWii),
            4 => Some(Platform::Psp),
            _ => None,
        }
    }
}

/// One symbol in a listing document: a named, ordered instruction stream.
///
/// `symbol_idx` is the symbol's ordinal within its object and is what
/// rehydration uses to find the stream again in the stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolListing {
    pub name: String,
    pub symbol_idx: i64,
    #[serde(default)]
    pub is_decompiled: bool,
    pub instructions: Vec<Instruction>,
}

impl SymbolListing {
    pub fn new(name: impl Into<String>, symbol_idx: i64) -> Self {
        Self { name: name.into(), symbol_idx, is_decompiled: false, instructions: Vec::new() }
    }

    pub fn with_instructions(mut self, instructions: Vec<Instruction>) -> Self {
        self.instructions = instructions;
        self
    }
}

/// The parsed form of a stored object blob: every symbol the disassembler
/// adapter extracted from one binary object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDocument {
    pub symbols: Vec<SymbolListing>,
}

impl ListingDocument {
    pub fn new(symbols: Vec<SymbolListing>) -> Self {
        Self { symbols }
    }

    pub fn symbol_by_idx(&self, symbol_idx: i64) -> Option<&SymbolListing> {
        self.symbols.iter().find(|s| s.symbol_idx == symbol_idx)
    }
}
