//! # VM Opcodes
//!
//! Opcode table for the ledger's stack VM plus the helpers every subsystem
//! needs to read or emit scripts: interop ids, the standard single-key
//! signature contract and a small `ScriptBuilder`.
//!
//! Only the operand layout of each opcode matters to the relay: it never
//! executes scripts, it only walks them.

use crate::entities::{ContractParam, PublicKey, ScriptHash};
use sha2::{Digest, Sha256};

/// Interop name for invoking a contract method.
pub const SYSTEM_CONTRACT_CALL: &str = "System.Contract.Call";

/// Interop name for a single-key signature check.
pub const SYSTEM_CRYPTO_CHECK_SIG: &str = "System.Crypto.CheckSig";

/// Stack item type tag for `Boolean` (operand of `CONVERT`).
pub const STACK_ITEM_BOOLEAN: u8 = 0x20;

/// Operand layout of an opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// No operand bytes.
    None,
    /// Exactly N operand bytes.
    Fixed(usize),
    /// A little-endian length prefix of N bytes, then that many bytes.
    Prefixed(usize),
}

macro_rules! opcodes {
    ($($name:ident = $byte:literal => $operand:expr,)+) => {
        /// VM opcode enumeration.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Opcode {
            $(
                #[allow(missing_docs)]
                $name = $byte,
            )+
        }

        impl Opcode {
            /// Try to decode an opcode from a byte.
            #[must_use]
            pub fn from_byte(byte: u8) -> Option<Self> {
                match byte {
                    $($byte => Some(Self::$name),)+
                    _ => None,
                }
            }

            /// Operand layout implied by this opcode.
            #[must_use]
            pub fn operand(&self) -> Operand {
                match self {
                    $(Self::$name => $operand,)+
                }
            }
        }
    };
}

use Operand::{Fixed, Prefixed};

opcodes! {
    // Constants
    PushInt8 = 0x00 => Fixed(1),
    PushInt16 = 0x01 => Fixed(2),
    PushInt32 = 0x02 => Fixed(4),
    PushInt64 = 0x03 => Fixed(8),
    PushInt128 = 0x04 => Fixed(16),
    PushInt256 = 0x05 => Fixed(32),
    PushT = 0x08 => Operand::None,
    PushF = 0x09 => Operand::None,
    PushA = 0x0A => Fixed(4),
    PushNull = 0x0B => Operand::None,
    PushData1 = 0x0C => Prefixed(1),
    PushData2 = 0x0D => Prefixed(2),
    PushData4 = 0x0E => Prefixed(4),
    PushM1 = 0x0F => Operand::None,
    Push0 = 0x10 => Operand::None,
    Push1 = 0x11 => Operand::None,
    Push2 = 0x12 => Operand::None,
    Push3 = 0x13 => Operand::None,
    Push4 = 0x14 => Operand::None,
    Push5 = 0x15 => Operand::None,
    Push6 = 0x16 => Operand::None,
    Push7 = 0x17 => Operand::None,
    Push8 = 0x18 => Operand::None,
    Push9 = 0x19 => Operand::None,
    Push10 = 0x1A => Operand::None,
    Push11 = 0x1B => Operand::None,
    Push12 = 0x1C => Operand::None,
    Push13 = 0x1D => Operand::None,
    Push14 = 0x1E => Operand::None,
    Push15 = 0x1F => Operand::None,
    Push16 = 0x20 => Operand::None,

    // Flow control
    Nop = 0x21 => Operand::None,
    Jmp = 0x22 => Fixed(1),
    JmpL = 0x23 => Fixed(4),
    JmpIf = 0x24 => Fixed(1),
    JmpIfL = 0x25 => Fixed(4),
    JmpIfNot = 0x26 => Fixed(1),
    JmpIfNotL = 0x27 => Fixed(4),
    JmpEq = 0x28 => Fixed(1),
    JmpEqL = 0x29 => Fixed(4),
    JmpNe = 0x2A => Fixed(1),
    JmpNeL = 0x2B => Fixed(4),
    JmpGt = 0x2C => Fixed(1),
    JmpGtL = 0x2D => Fixed(4),
    JmpGe = 0x2E => Fixed(1),
    JmpGeL = 0x2F => Fixed(4),
    JmpLt = 0x30 => Fixed(1),
    JmpLtL = 0x31 => Fixed(4),
    JmpLe = 0x32 => Fixed(1),
    JmpLeL = 0x33 => Fixed(4),
    Call = 0x34 => Fixed(1),
    CallL = 0x35 => Fixed(4),
    CallA = 0x36 => Operand::None,
    CallT = 0x37 => Fixed(2),
    Abort = 0x38 => Operand::None,
    Assert = 0x39 => Operand::None,
    Throw = 0x3A => Operand::None,
    Try = 0x3B => Fixed(2),
    TryL = 0x3C => Fixed(8),
    EndTry = 0x3D => Fixed(1),
    EndTryL = 0x3E => Fixed(4),
    EndFinally = 0x3F => Operand::None,
    Ret = 0x40 => Operand::None,
    Syscall = 0x41 => Fixed(4),

    // Stack
    Depth = 0x43 => Operand::None,
    Drop = 0x45 => Operand::None,
    Nip = 0x46 => Operand::None,
    XDrop = 0x48 => Operand::None,
    Clear = 0x49 => Operand::None,
    Dup = 0x4A => Operand::None,
    Over = 0x4B => Operand::None,
    Pick = 0x4D => Operand::None,
    Tuck = 0x4E => Operand::None,
    Swap = 0x50 => Operand::None,
    Rot = 0x51 => Operand::None,
    Roll = 0x52 => Operand::None,
    Reverse3 = 0x53 => Operand::None,
    Reverse4 = 0x54 => Operand::None,
    ReverseN = 0x55 => Operand::None,

    // Slots
    InitSSlot = 0x56 => Fixed(1),
    InitSlot = 0x57 => Fixed(2),
    LdSFld0 = 0x58 => Operand::None,
    LdSFld1 = 0x59 => Operand::None,
    LdSFld2 = 0x5A => Operand::None,
    LdSFld3 = 0x5B => Operand::None,
    LdSFld4 = 0x5C => Operand::None,
    LdSFld5 = 0x5D => Operand::None,
    LdSFld6 = 0x5E => Operand::None,
    LdSFld = 0x5F => Fixed(1),
    StSFld0 = 0x60 => Operand::None,
    StSFld1 = 0x61 => Operand::None,
    StSFld2 = 0x62 => Operand::None,
    StSFld3 = 0x63 => Operand::None,
    StSFld4 = 0x64 => Operand::None,
    StSFld5 = 0x65 => Operand::None,
    StSFld6 = 0x66 => Operand::None,
    StSFld = 0x67 => Fixed(1),
    LdLoc0 = 0x68 => Operand::None,
    LdLoc1 = 0x69 => Operand::None,
    LdLoc2 = 0x6A => Operand::None,
    LdLoc3 = 0x6B => Operand::None,
    LdLoc4 = 0x6C => Operand::None,
    LdLoc5 = 0x6D => Operand::None,
    LdLoc6 = 0x6E => Operand::None,
    LdLoc = 0x6F => Fixed(1),
    StLoc0 = 0x70 => Operand::None,
    StLoc1 = 0x71 => Operand::None,
    StLoc2 = 0x72 => Operand::None,
    StLoc3 = 0x73 => Operand::None,
    StLoc4 = 0x74 => Operand::None,
    StLoc5 = 0x75 => Operand::None,
    StLoc6 = 0x76 => Operand::None,
    StLoc = 0x77 => Fixed(1),
    LdArg0 = 0x78 => Operand::None,
    LdArg1 = 0x79 => Operand::None,
    LdArg2 = 0x7A => Operand::None,
    LdArg3 = 0x7B => Operand::None,
    LdArg4 = 0x7C => Operand::None,
    LdArg5 = 0x7D => Operand::None,
    LdArg6 = 0x7E => Operand::None,
    LdArg = 0x7F => Fixed(1),
    StArg0 = 0x80 => Operand::None,
    StArg1 = 0x81 => Operand::None,
    StArg2 = 0x82 => Operand::None,
    StArg3 = 0x83 => Operand::None,
    StArg4 = 0x84 => Operand::None,
    StArg5 = 0x85 => Operand::None,
    StArg6 = 0x86 => Operand::None,
    StArg = 0x87 => Fixed(1),

    // Splice
    NewBuffer = 0x88 => Operand::None,
    MemCpy = 0x89 => Operand::None,
    Cat = 0x8B => Operand::None,
    SubStr = 0x8C => Operand::None,
    Left = 0x8D => Operand::None,
    Right = 0x8E => Operand::None,

    // Bitwise logic
    Invert = 0x90 => Operand::None,
    And = 0x91 => Operand::None,
    Or = 0x92 => Operand::None,
    Xor = 0x93 => Operand::None,
    Equal = 0x97 => Operand::None,
    NotEqual = 0x98 => Operand::None,

    // Arithmetic
    Sign = 0x99 => Operand::None,
    Abs = 0x9A => Operand::None,
    Negate = 0x9B => Operand::None,
    Inc = 0x9C => Operand::None,
    Dec = 0x9D => Operand::None,
    Add = 0x9E => Operand::None,
    Sub = 0x9F => Operand::None,
    Mul = 0xA0 => Operand::None,
    Div = 0xA1 => Operand::None,
    Mod = 0xA2 => Operand::None,
    Pow = 0xA3 => Operand::None,
    Sqrt = 0xA4 => Operand::None,
    ModMul = 0xA5 => Operand::None,
    ModPow = 0xA6 => Operand::None,
    Shl = 0xA8 => Operand::None,
    Shr = 0xA9 => Operand::None,
    Not = 0xAA => Operand::None,
    BoolAnd = 0xAB => Operand::None,
    BoolOr = 0xAC => Operand::None,
    Nz = 0xB1 => Operand::None,
    NumEqual = 0xB3 => Operand::None,
    NumNotEqual = 0xB4 => Operand::None,
    Lt = 0xB5 => Operand::None,
    Le = 0xB6 => Operand::None,
    Gt = 0xB7 => Operand::None,
    Ge = 0xB8 => Operand::None,
    Min = 0xB9 => Operand::None,
    Max = 0xBA => Operand::None,
    Within = 0xBB => Operand::None,

    // Compound types
    PackMap = 0xBE => Operand::None,
    PackStruct = 0xBF => Operand::None,
    Pack = 0xC0 => Operand::None,
    Unpack = 0xC1 => Operand::None,
    NewArray0 = 0xC2 => Operand::None,
    NewArray = 0xC3 => Operand::None,
    NewArrayT = 0xC4 => Fixed(1),
    NewStruct0 = 0xC5 => Operand::None,
    NewStruct = 0xC6 => Operand::None,
    NewMap = 0xC8 => Operand::None,
    Size = 0xCA => Operand::None,
    HasKey = 0xCB => Operand::None,
    Keys = 0xCC => Operand::None,
    Values = 0xCD => Operand::None,
    PickItem = 0xCE => Operand::None,
    Append = 0xCF => Operand::None,
    SetItem = 0xD0 => Operand::None,
    ReverseItems = 0xD1 => Operand::None,
    Remove = 0xD2 => Operand::None,
    ClearItems = 0xD3 => Operand::None,
    PopItem = 0xD4 => Operand::None,

    // Types
    IsNull = 0xD8 => Operand::None,
    IsType = 0xD9 => Fixed(1),
    Convert = 0xDB => Fixed(1),

    // Extensions
    AbortMsg = 0xE0 => Operand::None,
    AssertMsg = 0xE1 => Operand::None,
}

impl Opcode {
    /// Returns true for any instruction that only pushes a constant.
    #[must_use]
    pub fn is_push(&self) -> bool {
        (*self as u8) <= Opcode::Push16 as u8
    }

    /// Value of the single-byte small-integer encodings (`PUSHM1`, `PUSH0..PUSH16`).
    #[must_use]
    pub fn small_int(&self) -> Option<i64> {
        match *self {
            Opcode::PushM1 => Some(-1),
            op if (Opcode::Push0 as u8..=Opcode::Push16 as u8).contains(&(op as u8)) => {
                Some(i64::from(op as u8 - Opcode::Push0 as u8))
            }
            _ => None,
        }
    }

    /// Returns true for the fixed-width `PUSHINT*` family.
    #[must_use]
    pub fn is_push_int(&self) -> bool {
        (*self as u8) <= Opcode::PushInt256 as u8
    }
}

/// Interop id of a syscall: first four bytes of SHA-256 of its name.
#[must_use]
pub fn interop_id(name: &str) -> [u8; 4] {
    let digest = Sha256::digest(name.as_bytes());
    let mut id = [0u8; 4];
    id.copy_from_slice(&digest[..4]);
    id
}

/// Standard single-key verification script for `key`.
#[must_use]
pub fn signature_contract(key: &PublicKey) -> Vec<u8> {
    let mut script = Vec::with_capacity(40);
    script.push(Opcode::PushData1 as u8);
    script.push(33);
    script.extend_from_slice(key.as_bytes());
    script.push(Opcode::Syscall as u8);
    script.extend_from_slice(&interop_id(SYSTEM_CRYPTO_CHECK_SIG));
    script
}

/// Extract the public key from a standard single-key verification script.
#[must_use]
pub fn parse_signature_contract(script: &[u8]) -> Option<PublicKey> {
    if script.len() != 40
        || script[0] != Opcode::PushData1 as u8
        || script[1] != 33
        || script[35] != Opcode::Syscall as u8
        || script[36..] != interop_id(SYSTEM_CRYPTO_CHECK_SIG)
    {
        return None;
    }
    PublicKey::from_slice(&script[2..35]).ok()
}

/// Incremental script emitter.
///
/// Produces the same encodings the relay's decoder accepts, so tests and
/// outbound calls share one source of truth.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a bare opcode.
    pub fn emit(&mut self, op: Opcode) -> &mut Self {
        self.script.push(op as u8);
        self
    }

    /// Emit an opcode followed by raw operand bytes.
    pub fn emit_with(&mut self, op: Opcode, operand: &[u8]) -> &mut Self {
        self.script.push(op as u8);
        self.script.extend_from_slice(operand);
        self
    }

    /// Emit the shortest integer push for `value`.
    pub fn push_int(&mut self, value: i64) -> &mut Self {
        if (-1..=16).contains(&value) {
            self.script.push((Opcode::Push0 as u8 as i64 + value) as u8);
            return self;
        }

        let mut bytes = value.to_le_bytes().to_vec();
        let sign_byte = if value < 0 { 0xFF } else { 0x00 };
        while bytes.len() > 1
            && bytes[bytes.len() - 1] == sign_byte
            && (bytes[bytes.len() - 2] & 0x80) == (sign_byte & 0x80)
        {
            bytes.pop();
        }

        let (op, width) = match bytes.len() {
            1 => (Opcode::PushInt8, 1),
            2 => (Opcode::PushInt16, 2),
            3 | 4 => (Opcode::PushInt32, 4),
            _ => (Opcode::PushInt64, 8),
        };
        bytes.resize(width, sign_byte);
        self.emit_with(op, &bytes)
    }

    /// Emit a byte-string push with the smallest length prefix.
    pub fn push_bytes(&mut self, data: &[u8]) -> &mut Self {
        let len = data.len();
        if len < 0x100 {
            self.script.push(Opcode::PushData1 as u8);
            self.script.push(len as u8);
        } else if len < 0x1_0000 {
            self.script.push(Opcode::PushData2 as u8);
            self.script.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.script.push(Opcode::PushData4 as u8);
            self.script.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.script.extend_from_slice(data);
        self
    }

    /// Emit a boolean as `PUSHT|PUSHF` + `CONVERT Boolean`.
    pub fn push_bool(&mut self, value: bool) -> &mut Self {
        self.emit(if value { Opcode::PushT } else { Opcode::PushF });
        self.emit_with(Opcode::Convert, &[STACK_ITEM_BOOLEAN])
    }

    /// Emit one contract parameter.
    pub fn push_param(&mut self, param: &ContractParam) -> &mut Self {
        match param {
            ContractParam::Hash160(hash) => self.push_bytes(hash.as_bytes()),
            ContractParam::Bytes(bytes) => self.push_bytes(bytes),
            ContractParam::String(s) => self.push_bytes(s.as_bytes()),
            ContractParam::Integer(value) => self.push_int(*value),
            ContractParam::Bool(value) => self.push_bool(*value),
            ContractParam::Null => self.emit(Opcode::PushNull),
            ContractParam::Array(items) => self.push_array(items),
        }
    }

    /// Emit an array: elements in reverse order, the count, then `PACK`.
    pub fn push_array(&mut self, items: &[ContractParam]) -> &mut Self {
        if items.is_empty() {
            return self.emit(Opcode::NewArray0);
        }
        for item in items.iter().rev() {
            self.push_param(item);
        }
        self.push_int(items.len() as i64);
        self.emit(Opcode::Pack)
    }

    /// Emit a full contract invocation: args, flags, method, contract, syscall.
    pub fn contract_call(
        &mut self,
        contract: &ScriptHash,
        method: &str,
        call_flags: u8,
        args: &[ContractParam],
    ) -> &mut Self {
        self.push_array(args);
        self.push_int(i64::from(call_flags));
        self.push_bytes(method.as_bytes());
        self.push_bytes(contract.as_bytes());
        self.emit_with(Opcode::Syscall, &interop_id(SYSTEM_CONTRACT_CALL))
    }

    /// Finish the script.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        self.script.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_table_roundtrips_every_byte() {
        for byte in 0..=u8::MAX {
            if let Some(op) = Opcode::from_byte(byte) {
                assert_eq!(op as u8, byte);
            }
        }
        assert_eq!(Opcode::from_byte(0x06), None);
        assert_eq!(Opcode::from_byte(0x42), None);
        assert_eq!(Opcode::from_byte(0xFF), None);
    }

    #[test]
    fn test_operand_layouts() {
        assert_eq!(Opcode::PushInt256.operand(), Operand::Fixed(32));
        assert_eq!(Opcode::PushData2.operand(), Operand::Prefixed(2));
        assert_eq!(Opcode::Syscall.operand(), Operand::Fixed(4));
        assert_eq!(Opcode::TryL.operand(), Operand::Fixed(8));
        assert_eq!(Opcode::Pack.operand(), Operand::None);
    }

    #[test]
    fn test_small_int() {
        assert_eq!(Opcode::PushM1.small_int(), Some(-1));
        assert_eq!(Opcode::Push0.small_int(), Some(0));
        assert_eq!(Opcode::Push16.small_int(), Some(16));
        assert_eq!(Opcode::PushT.small_int(), None);
        assert_eq!(Opcode::PushInt8.small_int(), None);
    }

    #[test]
    fn test_contract_call_interop_id() {
        assert_eq!(interop_id(SYSTEM_CONTRACT_CALL), [0x62, 0x7d, 0x5b, 0x52]);
        assert_eq!(interop_id(SYSTEM_CRYPTO_CHECK_SIG), [0x56, 0xe7, 0xb3, 0x27]);
    }

    #[test]
    fn test_push_int_encodings() {
        assert_eq!(ScriptBuilder::new().push_int(-1).build(), vec![0x0F]);
        assert_eq!(ScriptBuilder::new().push_int(16).build(), vec![0x20]);
        assert_eq!(ScriptBuilder::new().push_int(17).build(), vec![0x00, 17]);
        assert_eq!(ScriptBuilder::new().push_int(128).build(), vec![0x01, 0x80, 0x00]);
        assert_eq!(ScriptBuilder::new().push_int(-2).build(), vec![0x00, 0xFE]);
        assert_eq!(
            ScriptBuilder::new().push_int(0x10_0000).build(),
            vec![0x02, 0x00, 0x00, 0x10, 0x00]
        );
    }

    #[test]
    fn test_push_bytes_prefix_width() {
        let short = ScriptBuilder::new().push_bytes(&[7u8; 3]).build();
        assert_eq!(&short[..2], &[0x0C, 3]);

        let long = ScriptBuilder::new().push_bytes(&[7u8; 300]).build();
        assert_eq!(&long[..3], &[0x0D, 0x2C, 0x01]);
    }

    #[test]
    fn test_signature_contract_roundtrip() {
        let mut raw = [0x11u8; 33];
        raw[0] = 0x02;
        let key = PublicKey::from_slice(&raw).unwrap();
        let script = signature_contract(&key);
        assert_eq!(script.len(), 40);
        assert_eq!(parse_signature_contract(&script), Some(key));
    }

    #[test]
    fn test_parse_signature_contract_rejects_other_scripts() {
        assert_eq!(parse_signature_contract(&[Opcode::Ret as u8]), None);
        let mut raw = [0x11u8; 33];
        raw[0] = 0x03;
        let mut script = signature_contract(&PublicKey::from_slice(&raw).unwrap());
        script[36] ^= 0xFF;
        assert_eq!(parse_signature_contract(&script), None);
    }
}
