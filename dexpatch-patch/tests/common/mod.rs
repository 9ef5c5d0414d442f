#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use dexpatch_ir::*;
use dexpatch_isa::*;
use dexpatch_patch::*;

pub fn mv(a: u16, b: u16) -> Instruction {
    Instruction::new(Opcode::Move, Operands::Two { a: Reg(a), b: Reg(b) })
}

pub fn body(registers: u16, params: u16, instructions: Vec<Instruction>) -> MethodBody {
    MethodBody::new(registers, params, instructions)
}

pub fn method(
    name: &str,
    params: &[&str],
    flags: AccessFlags,
    implementation: Option<MethodBody>,
) -> MethodDef {
    MethodDef {
        name: name.to_string(),
        prototype: Prototype::new(params.iter().copied(), "V"),
        access_flags: flags,
        implementation,
    }
}

pub fn program(class: &str, methods: Vec<MethodDef>) -> Program {
    programs(vec![(class, methods)])
}

pub fn programs(classes: Vec<(&str, Vec<MethodDef>)>) -> Program {
    Program {
        classes: classes
            .into_iter()
            .map(|(descriptor, methods)| ClassDef {
                descriptor: descriptor.to_string(),
                methods,
            })
            .collect(),
    }
}

pub fn method_ref(class: &str, name: &str) -> Reference {
    Reference::Method(MethodRef::new(class, name, ["I"], "V"))
}

/// Operands of the given shape with small registers, distinct non-register
/// fields, and non-zero padding in argument lists.
pub fn sample_operands(shape: OperandShape) -> Operands {
    let args = ArgList {
        count: 2,
        registers: [Reg(4), Reg(5), Reg(9), Reg(9), Reg(9)],
    };
    let range = RegRange {
        start: Reg(7),
        count: 3,
    };
    match shape {
        OperandShape::Nullary => Operands::Nullary,
        OperandShape::Branch => Operands::Branch { offset: -3 },
        OperandShape::VerificationError => Operands::VerificationError {
            kind: 1,
            reference: Reference::Type("LMissing;".into()),
        },
        OperandShape::One => Operands::One { a: Reg(1) },
        OperandShape::OneLiteral => Operands::OneLiteral {
            a: Reg(2),
            literal: Literal::Narrow(-2),
        },
        OperandShape::OneReference => Operands::OneReference {
            a: Reg(3),
            reference: Reference::String("s".into()),
        },
        OperandShape::OneBranch => Operands::OneBranch {
            a: Reg(4),
            offset: 7,
        },
        OperandShape::Two => Operands::Two { a: Reg(1), b: Reg(2) },
        OperandShape::TwoLiteral => Operands::TwoLiteral {
            a: Reg(3),
            b: Reg(4),
            literal: Literal::Narrow(5),
        },
        OperandShape::TwoReference => Operands::TwoReference {
            a: Reg(5),
            b: Reg(6),
            reference: Reference::Field(FieldRef {
                class: "LFoo;".into(),
                name: "f".into(),
                field_type: "I".into(),
            }),
        },
        OperandShape::TwoIndexed => Operands::TwoIndexed {
            a: Reg(7),
            b: Reg(8),
            index: TableIndex::FieldOffset(12),
        },
        OperandShape::TwoBranch => Operands::TwoBranch {
            a: Reg(9),
            b: Reg(10),
            offset: -12,
        },
        OperandShape::Three => Operands::Three {
            a: Reg(1),
            b: Reg(2),
            c: Reg(3),
        },
        OperandShape::Invoke => Operands::Invoke {
            args,
            reference: method_ref("LFoo;", "m"),
        },
        OperandShape::InvokeIndexed => Operands::InvokeIndexed {
            args,
            index: TableIndex::Vtable(3),
        },
        OperandShape::InvokePolymorphic => Operands::InvokePolymorphic {
            args,
            method: method_ref("Ljava/lang/invoke/MethodHandle;", "invoke"),
            proto: Reference::MethodProto(ProtoRef {
                parameters: vec!["I".into()],
                return_type: "V".into(),
            }),
        },
        OperandShape::Range => Operands::Range {
            range,
            reference: method_ref("LFoo;", "r"),
        },
        OperandShape::RangeIndexed => Operands::RangeIndexed {
            range,
            index: TableIndex::Inline(1),
        },
        OperandShape::RangePolymorphic => Operands::RangePolymorphic {
            range,
            method: method_ref("Ljava/lang/invoke/MethodHandle;", "invokeExact"),
            proto: Reference::MethodProto(ProtoRef {
                parameters: vec![],
                return_type: "V".into(),
            }),
        },
        OperandShape::ArrayData => Operands::ArrayData {
            element_width: 4,
            elements: vec![1, -2, 3],
        },
        OperandShape::PackedSwitch => Operands::PackedSwitch {
            first_key: 10,
            targets: vec![3, 6],
        },
        OperandShape::SparseSwitch => Operands::SparseSwitch {
            cases: vec![SwitchCase { key: -1, target: 8 }],
        },
    }
}

pub fn sample(opcode: Opcode) -> Instruction {
    Instruction::new(opcode, sample_operands(opcode.format().operand_shape()))
}

/// Records the kind of every event it sees.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl PatchObserver for Recorder {
    fn on_event(&self, event: &PatchEvent<'_>) {
        let kind = match event {
            PatchEvent::MethodMatched(_) => "matched",
            PatchEvent::RegisterAdded { .. } => "register_added",
            PatchEvent::RegisterReused { .. } => "register_reused",
            PatchEvent::InstructionsShifted { .. } => "shifted",
            PatchEvent::PreambleInjected { .. } => "preamble",
            PatchEvent::MethodSkipped { .. } => "skipped",
            PatchEvent::ParameterCountMismatch { .. } => "parameter_mismatch",
            PatchEvent::MethodNotFound(_) => "not_found",
        };
        self.0.lock().unwrap().push(kind.to_string());
    }
}
