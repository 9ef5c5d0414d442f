//! Dalvik opcodes.
//!
//! Numeric opcode values differ between dex versions and are assigned by the
//! encoder, so an [`Opcode`] here is identified by its mnemonic only.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::format::Format;
use crate::reference::ReferenceType;

macro_rules! opcodes {
    ($($variant:ident => $mnemonic:literal, $format:ident, $reference:ident;)*) => {
        /// A Dalvik opcode.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Opcode {
            $($variant,)*
        }

        impl Opcode {
            /// Every opcode, in declaration order.
            pub const ALL: &'static [Opcode] = &[$(Opcode::$variant,)*];

            /// Smali mnemonic, e.g. `"invoke-static"`.
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $(Opcode::$variant => $mnemonic,)*
                }
            }

            pub const fn format(self) -> Format {
                match self {
                    $(Opcode::$variant => Format::$format,)*
                }
            }

            /// Kind of the (first) constant-pool reference the opcode carries.
            pub const fn reference_type(self) -> ReferenceType {
                match self {
                    $(Opcode::$variant => ReferenceType::$reference,)*
                }
            }
        }
    };
}

opcodes! {
    Nop => "nop", Format10x, None;
    Move => "move", Format12x, None;
    MoveFrom16 => "move/from16", Format22x, None;
    Move16 => "move/16", Format32x, None;
    MoveWide => "move-wide", Format12x, None;
    MoveWideFrom16 => "move-wide/from16", Format22x, None;
    MoveWide16 => "move-wide/16", Format32x, None;
    MoveObject => "move-object", Format12x, None;
    MoveObjectFrom16 => "move-object/from16", Format22x, None;
    MoveObject16 => "move-object/16", Format32x, None;
    MoveResult => "move-result", Format11x, None;
    MoveResultWide => "move-result-wide", Format11x, None;
    MoveResultObject => "move-result-object", Format11x, None;
    MoveException => "move-exception", Format11x, None;
    ReturnVoid => "return-void", Format10x, None;
    Return => "return", Format11x, None;
    ReturnWide => "return-wide", Format11x, None;
    ReturnObject => "return-object", Format11x, None;
    Const4 => "const/4", Format11n, None;
    Const16 => "const/16", Format21s, None;
    Const => "const", Format31i, None;
    ConstHigh16 => "const/high16", Format21ih, None;
    ConstWide16 => "const-wide/16", Format21s, None;
    ConstWide32 => "const-wide/32", Format31i, None;
    ConstWide => "const-wide", Format51l, None;
    ConstWideHigh16 => "const-wide/high16", Format21lh, None;
    ConstString => "const-string", Format21c, String;
    ConstStringJumbo => "const-string/jumbo", Format31c, String;
    ConstClass => "const-class", Format21c, Type;
    MonitorEnter => "monitor-enter", Format11x, None;
    MonitorExit => "monitor-exit", Format11x, None;
    CheckCast => "check-cast", Format21c, Type;
    InstanceOf => "instance-of", Format22c, Type;
    ArrayLength => "array-length", Format12x, None;
    NewInstance => "new-instance", Format21c, Type;
    NewArray => "new-array", Format22c, Type;
    FilledNewArray => "filled-new-array", Format35c, Type;
    FilledNewArrayRange => "filled-new-array/range", Format3rc, Type;
    FillArrayData => "fill-array-data", Format31t, None;
    Throw => "throw", Format11x, None;
    Goto => "goto", Format10t, None;
    Goto16 => "goto/16", Format20t, None;
    Goto32 => "goto/32", Format30t, None;
    PackedSwitch => "packed-switch", Format31t, None;
    SparseSwitch => "sparse-switch", Format31t, None;
    CmplFloat => "cmpl-float", Format23x, None;
    CmpgFloat => "cmpg-float", Format23x, None;
    CmplDouble => "cmpl-double", Format23x, None;
    CmpgDouble => "cmpg-double", Format23x, None;
    CmpLong => "cmp-long", Format23x, None;
    IfEq => "if-eq", Format22t, None;
    IfNe => "if-ne", Format22t, None;
    IfLt => "if-lt", Format22t, None;
    IfGe => "if-ge", Format22t, None;
    IfGt => "if-gt", Format22t, None;
    IfLe => "if-le", Format22t, None;
    IfEqz => "if-eqz", Format21t, None;
    IfNez => "if-nez", Format21t, None;
    IfLtz => "if-ltz", Format21t, None;
    IfGez => "if-gez", Format21t, None;
    IfGtz => "if-gtz", Format21t, None;
    IfLez => "if-lez", Format21t, None;
    Aget => "aget", Format23x, None;
    AgetWide => "aget-wide", Format23x, None;
    AgetObject => "aget-object", Format23x, None;
    AgetBoolean => "aget-boolean", Format23x, None;
    AgetByte => "aget-byte", Format23x, None;
    AgetChar => "aget-char", Format23x, None;
    AgetShort => "aget-short", Format23x, None;
    Aput => "aput", Format23x, None;
    AputWide => "aput-wide", Format23x, None;
    AputObject => "aput-object", Format23x, None;
    AputBoolean => "aput-boolean", Format23x, None;
    AputByte => "aput-byte", Format23x, None;
    AputChar => "aput-char", Format23x, None;
    AputShort => "aput-short", Format23x, None;
    Iget => "iget", Format22c, Field;
    IgetWide => "iget-wide", Format22c, Field;
    IgetObject => "iget-object", Format22c, Field;
    IgetBoolean => "iget-boolean", Format22c, Field;
    IgetByte => "iget-byte", Format22c, Field;
    IgetChar => "iget-char", Format22c, Field;
    IgetShort => "iget-short", Format22c, Field;
    Iput => "iput", Format22c, Field;
    IputWide => "iput-wide", Format22c, Field;
    IputObject => "iput-object", Format22c, Field;
    IputBoolean => "iput-boolean", Format22c, Field;
    IputByte => "iput-byte", Format22c, Field;
    IputChar => "iput-char", Format22c, Field;
    IputShort => "iput-short", Format22c, Field;
    Sget => "sget", Format21c, Field;
    SgetWide => "sget-wide", Format21c, Field;
    SgetObject => "sget-object", Format21c, Field;
    SgetBoolean => "sget-boolean", Format21c, Field;
    SgetByte => "sget-byte", Format21c, Field;
    SgetChar => "sget-char", Format21c, Field;
    SgetShort => "sget-short", Format21c, Field;
    Sput => "sput", Format21c, Field;
    SputWide => "sput-wide", Format21c, Field;
    SputObject => "sput-object", Format21c, Field;
    SputBoolean => "sput-boolean", Format21c, Field;
    SputByte => "sput-byte", Format21c, Field;
    SputChar => "sput-char", Format21c, Field;
    SputShort => "sput-short", Format21c, Field;
    InvokeVirtual => "invoke-virtual", Format35c, Method;
    InvokeSuper => "invoke-super", Format35c, Method;
    InvokeDirect => "invoke-direct", Format35c, Method;
    InvokeStatic => "invoke-static", Format35c, Method;
    InvokeInterface => "invoke-interface", Format35c, Method;
    InvokeVirtualRange => "invoke-virtual/range", Format3rc, Method;
    InvokeSuperRange => "invoke-super/range", Format3rc, Method;
    InvokeDirectRange => "invoke-direct/range", Format3rc, Method;
    InvokeStaticRange => "invoke-static/range", Format3rc, Method;
    InvokeInterfaceRange => "invoke-interface/range", Format3rc, Method;
    NegInt => "neg-int", Format12x, None;
    NotInt => "not-int", Format12x, None;
    NegLong => "neg-long", Format12x, None;
    NotLong => "not-long", Format12x, None;
    NegFloat => "neg-float", Format12x, None;
    NegDouble => "neg-double", Format12x, None;
    IntToLong => "int-to-long", Format12x, None;
    IntToFloat => "int-to-float", Format12x, None;
    IntToDouble => "int-to-double", Format12x, None;
    LongToInt => "long-to-int", Format12x, None;
    LongToFloat => "long-to-float", Format12x, None;
    LongToDouble => "long-to-double", Format12x, None;
    FloatToInt => "float-to-int", Format12x, None;
    FloatToLong => "float-to-long", Format12x, None;
    FloatToDouble => "float-to-double", Format12x, None;
    DoubleToInt => "double-to-int", Format12x, None;
    DoubleToLong => "double-to-long", Format12x, None;
    DoubleToFloat => "double-to-float", Format12x, None;
    IntToByte => "int-to-byte", Format12x, None;
    IntToChar => "int-to-char", Format12x, None;
    IntToShort => "int-to-short", Format12x, None;
    AddInt => "add-int", Format23x, None;
    SubInt => "sub-int", Format23x, None;
    MulInt => "mul-int", Format23x, None;
    DivInt => "div-int", Format23x, None;
    RemInt => "rem-int", Format23x, None;
    AndInt => "and-int", Format23x, None;
    OrInt => "or-int", Format23x, None;
    XorInt => "xor-int", Format23x, None;
    ShlInt => "shl-int", Format23x, None;
    ShrInt => "shr-int", Format23x, None;
    UshrInt => "ushr-int", Format23x, None;
    AddLong => "add-long", Format23x, None;
    SubLong => "sub-long", Format23x, None;
    MulLong => "mul-long", Format23x, None;
    DivLong => "div-long", Format23x, None;
    RemLong => "rem-long", Format23x, None;
    AndLong => "and-long", Format23x, None;
    OrLong => "or-long", Format23x, None;
    XorLong => "xor-long", Format23x, None;
    ShlLong => "shl-long", Format23x, None;
    ShrLong => "shr-long", Format23x, None;
    UshrLong => "ushr-long", Format23x, None;
    AddFloat => "add-float", Format23x, None;
    SubFloat => "sub-float", Format23x, None;
    MulFloat => "mul-float", Format23x, None;
    DivFloat => "div-float", Format23x, None;
    RemFloat => "rem-float", Format23x, None;
    AddDouble => "add-double", Format23x, None;
    SubDouble => "sub-double", Format23x, None;
    MulDouble => "mul-double", Format23x, None;
    DivDouble => "div-double", Format23x, None;
    RemDouble => "rem-double", Format23x, None;
    AddInt2addr => "add-int/2addr", Format12x, None;
    SubInt2addr => "sub-int/2addr", Format12x, None;
    MulInt2addr => "mul-int/2addr", Format12x, None;
    DivInt2addr => "div-int/2addr", Format12x, None;
    RemInt2addr => "rem-int/2addr", Format12x, None;
    AndInt2addr => "and-int/2addr", Format12x, None;
    OrInt2addr => "or-int/2addr", Format12x, None;
    XorInt2addr => "xor-int/2addr", Format12x, None;
    ShlInt2addr => "shl-int/2addr", Format12x, None;
    ShrInt2addr => "shr-int/2addr", Format12x, None;
    UshrInt2addr => "ushr-int/2addr", Format12x, None;
    AddLong2addr => "add-long/2addr", Format12x, None;
    SubLong2addr => "sub-long/2addr", Format12x, None;
    MulLong2addr => "mul-long/2addr", Format12x, None;
    DivLong2addr => "div-long/2addr", Format12x, None;
    RemLong2addr => "rem-long/2addr", Format12x, None;
    AndLong2addr => "and-long/2addr", Format12x, None;
    OrLong2addr => "or-long/2addr", Format12x, None;
    XorLong2addr => "xor-long/2addr", Format12x, None;
    ShlLong2addr => "shl-long/2addr", Format12x, None;
    ShrLong2addr => "shr-long/2addr", Format12x, None;
    UshrLong2addr => "ushr-long/2addr", Format12x, None;
    AddFloat2addr => "add-float/2addr", Format12x, None;
    SubFloat2addr => "sub-float/2addr", Format12x, None;
    MulFloat2addr => "mul-float/2addr", Format12x, None;
    DivFloat2addr => "div-float/2addr", Format12x, None;
    RemFloat2addr => "rem-float/2addr", Format12x, None;
    AddDouble2addr => "add-double/2addr", Format12x, None;
    SubDouble2addr => "sub-double/2addr", Format12x, None;
    MulDouble2addr => "mul-double/2addr", Format12x, None;
    DivDouble2addr => "div-double/2addr", Format12x, None;
    RemDouble2addr => "rem-double/2addr", Format12x, None;
    AddIntLit16 => "add-int/lit16", Format22s, None;
    RsubInt => "rsub-int", Format22s, None;
    MulIntLit16 => "mul-int/lit16", Format22s, None;
    DivIntLit16 => "div-int/lit16", Format22s, None;
    RemIntLit16 => "rem-int/lit16", Format22s, None;
    AndIntLit16 => "and-int/lit16", Format22s, None;
    OrIntLit16 => "or-int/lit16", Format22s, None;
    XorIntLit16 => "xor-int/lit16", Format22s, None;
    AddIntLit8 => "add-int/lit8", Format22b, None;
    RsubIntLit8 => "rsub-int/lit8", Format22b, None;
    MulIntLit8 => "mul-int/lit8", Format22b, None;
    DivIntLit8 => "div-int/lit8", Format22b, None;
    RemIntLit8 => "rem-int/lit8", Format22b, None;
    AndIntLit8 => "and-int/lit8", Format22b, None;
    OrIntLit8 => "or-int/lit8", Format22b, None;
    XorIntLit8 => "xor-int/lit8", Format22b, None;
    ShlIntLit8 => "shl-int/lit8", Format22b, None;
    ShrIntLit8 => "shr-int/lit8", Format22b, None;
    UshrIntLit8 => "ushr-int/lit8", Format22b, None;
    InvokePolymorphic => "invoke-polymorphic", Format45cc, Method;
    InvokePolymorphicRange => "invoke-polymorphic/range", Format4rcc, Method;
    InvokeCustom => "invoke-custom", Format35c, CallSite;
    InvokeCustomRange => "invoke-custom/range", Format3rc, CallSite;
    ConstMethodHandle => "const-method-handle", Format21c, MethodHandle;
    ConstMethodType => "const-method-type", Format21c, MethodProto;

    // odex-only
    ThrowVerificationError => "throw-verification-error", Format20bc, None;
    ExecuteInline => "execute-inline", Format35mi, None;
    ExecuteInlineRange => "execute-inline/range", Format3rmi, None;
    InvokeObjectInitRange => "invoke-object-init/range", Format3rc, Method;
    ReturnVoidBarrier => "return-void-barrier", Format10x, None;
    ReturnVoidNoBarrier => "return-void-no-barrier", Format10x, None;
    IgetQuick => "iget-quick", Format22cs, None;
    IgetWideQuick => "iget-wide-quick", Format22cs, None;
    IgetObjectQuick => "iget-object-quick", Format22cs, None;
    IgetBooleanQuick => "iget-boolean-quick", Format22cs, None;
    IgetByteQuick => "iget-byte-quick", Format22cs, None;
    IgetCharQuick => "iget-char-quick", Format22cs, None;
    IgetShortQuick => "iget-short-quick", Format22cs, None;
    IputQuick => "iput-quick", Format22cs, None;
    IputWideQuick => "iput-wide-quick", Format22cs, None;
    IputObjectQuick => "iput-object-quick", Format22cs, None;
    IputBooleanQuick => "iput-boolean-quick", Format22cs, None;
    IputByteQuick => "iput-byte-quick", Format22cs, None;
    IputCharQuick => "iput-char-quick", Format22cs, None;
    IputShortQuick => "iput-short-quick", Format22cs, None;
    InvokeVirtualQuick => "invoke-virtual-quick", Format35ms, None;
    InvokeVirtualQuickRange => "invoke-virtual-quick/range", Format3rms, None;
    InvokeSuperQuick => "invoke-super-quick", Format35ms, None;
    InvokeSuperQuickRange => "invoke-super-quick/range", Format3rms, None;

    // payload pseudo-instructions
    PackedSwitchPayload => "packed-switch-payload", PackedSwitchPayload, None;
    SparseSwitchPayload => "sparse-switch-payload", SparseSwitchPayload, None;
    ArrayPayload => "array-payload", ArrayPayload, None;
}

impl Opcode {
    /// Kind of the second reference, present only on invoke-polymorphic.
    pub const fn reference_type2(self) -> Option<ReferenceType> {
        match self {
            Opcode::InvokePolymorphic | Opcode::InvokePolymorphicRange => {
                Some(ReferenceType::MethodProto)
            }
            _ => None,
        }
    }

    /// Look up an opcode by its smali mnemonic.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.mnemonic() == mnemonic)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Error returned when parsing an unknown mnemonic.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown opcode mnemonic {0:?}")]
pub struct UnknownOpcode(pub String);

impl FromStr for Opcode {
    type Err = UnknownOpcode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_mnemonic(s).ok_or_else(|| UnknownOpcode(s.to_owned()))
    }
}

impl Serialize for Opcode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.mnemonic())
    }
}

impl<'de> Deserialize<'de> for Opcode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
