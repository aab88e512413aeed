//! Normalization and hashing of instruction streams.
//!
//! Every instruction is reduced to three canonical text forms of increasing
//! fidelity:
//!
//! - **opcode**: the mnemonic alone.
//! - **equivalence**: mnemonic plus abstracted operands. Registers keep
//!   their identity; integer literals collapse to `<imm>`; relocated
//!   operands collapse to `<sym>`; branch targets collapse to `<branch>`;
//!   addends are dropped. Two instructions that assemble to the same code
//!   modulo relocations and immediates share this form.
//! - **exact**: mnemonic and operands verbatim, including immediates,
//!   relocation symbol names, and addends.
//!
//! A symbol's fingerprint at a fidelity is the folded hash of its ordered
//! canonical forms at that fidelity. One seeded 64-bit hash is used for all
//! of them and for the window index; ingestion and lookup must fold with the
//! same seed or nothing will ever compare equal.

pub mod windows;

use crate::model::Instruction;

/// Default fold seed (the FNV-1a offset basis). Deployments may override it
/// through configuration, but must then re-ingest everything.
pub const DEFAULT_HASH_SEED: u64 = 0xcbf2_9ce4_8422_2325;

const FNV_PRIME: u64 = 0x100_0000_01b3;

const IMM_SENTINEL: &str = "<imm>";
const SYM_SENTINEL: &str = "<sym>";
const BRANCH_SENTINEL: &str = "<branch>";

/// Seeded FNV-1a folding hasher.
///
/// `std::hash::DefaultHasher` is explicitly unspecified across releases, and
/// fingerprints here are persisted, so the fold is spelled out. Strings are
/// written length-prefixed to keep concatenated sequences unambiguous.
#[derive(Debug, Clone, Copy)]
pub struct Hasher64 {
    state: u64,
}

impl Hasher64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= u64::from(b);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    pub fn finish(&self) -> u64 {
        self.state
    }
}

/// The three per-symbol fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprints {
    pub opcode: u64,
    pub equiv: u64,
    pub exact: u64,
}

/// Canonical opcode-only form.
pub fn opcode_form(insn: &Instruction) -> &str {
    &insn.opcode
}

/// Canonical equivalence form: mnemonic plus abstracted operands.
pub fn equivalence_form(insn: &Instruction) -> String {
    let mut out = insn.opcode.clone();
    for (i, arg) in insn.arguments.iter().enumerate() {
        out.push(if i == 0 { ' ' } else { ',' });
        out.push_str(&equivalence_argument(insn, arg));
    }
    out
}

/// Canonical exact form: mnemonic and operands verbatim, plus relocation
/// metadata. The instruction address and the rendered branch destination are
/// never included, so byte-identical code at different load addresses still
/// compares equal.
pub fn exact_form(insn: &Instruction) -> String {
    let mut out = insn.opcode.clone();
    for (i, arg) in insn.arguments.iter().enumerate() {
        out.push(if i == 0 { ' ' } else { ',' });
        out.push_str(arg);
    }
    if let Some(symbol) = &insn.symbol {
        out.push('@');
        out.push_str(symbol);
        if let Some(addend) = &insn.addend {
            out.push('+');
            out.push_str(addend);
        }
    }
    out
}

fn equivalence_argument(insn: &Instruction, arg: &str) -> String {
    if let Some(symbol) = &insn.symbol {
        if !symbol.is_empty() && arg.contains(symbol.as_str()) {
            return SYM_SENTINEL.to_string();
        }
    }
    if let Some(dest) = &insn.branch_dest {
        if !dest.is_empty()
            && arg.to_ascii_lowercase().contains(&dest.to_ascii_lowercase())
        {
            return BRANCH_SENTINEL.to_string();
        }
    }
    collapse_integers(arg)
}

/// Replace every standalone integer literal (decimal or 0x-hex, optionally
/// negated) with `<imm>`. A digit run glued to an identifier character stays
/// put, so register names like `$t0` or `r31` keep their identity while
/// `-0x18` and `0x10($sp)` collapse.
fn collapse_integers(arg: &str) -> String {
    let bytes = arg.as_bytes();
    // Only ASCII bytes are ever replaced, so the output stays valid UTF-8.
    let mut out: Vec<u8> = Vec::with_capacity(arg.len());
    let mut i = 0;
    let mut prev: Option<u8> = None;

    while i < bytes.len() {
        let b = bytes[i];
        let glued = matches!(prev, Some(p) if p.is_ascii_alphanumeric() || p == b'_' || p == b'$' || p == b'%');
        let minus_literal = b == b'-'
            && !glued
            && i + 1 < bytes.len()
            && bytes[i + 1].is_ascii_digit();

        if (b.is_ascii_digit() && !glued) || minus_literal {
            let mut j = if minus_literal { i + 1 } else { i };
            if j + 1 < bytes.len() && bytes[j] == b'0' && (bytes[j + 1] | 0x20) == b'x' {
                j += 2;
                while j < bytes.len() && bytes[j].is_ascii_hexdigit() {
                    j += 1;
                }
            } else {
                while j < bytes.len() && bytes[j].is_ascii_digit() {
                    j += 1;
                }
            }
            out.extend_from_slice(IMM_SENTINEL.as_bytes());
            prev = Some(b'>');
            i = j;
        } else {
            out.push(b);
            prev = Some(b);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Compute the three whole-symbol fingerprints for an instruction stream.
pub fn fingerprint_symbol(instructions: &[Instruction], seed: u64) -> Fingerprints {
    let mut opcode = Hasher64::new(seed);
    let mut equiv = Hasher64::new(seed);
    let mut exact = Hasher64::new(seed);

    for insn in instructions {
        opcode.write_str(opcode_form(insn));
        equiv.write_str(&equivalence_form(insn));
        exact.write_str(&exact_form(insn));
    }

    Fingerprints { opcode: opcode.finish(), equiv: equiv.finish(), exact: exact.finish() }
}

/// The per-instruction equivalence fingerprint stream the window index is
/// built over.
pub fn equivalence_stream(instructions: &[Instruction], seed: u64) -> Vec<u64> {
    instructions
        .iter()
        .map(|insn| {
            let mut h = Hasher64::new(seed);
            h.write_str(&equivalence_form(insn));
            h.finish()
        })
        .collect()
}
