mod common;

use common::{invoke, method};
use dexpatch_isa::*;

#[test]
fn views_expose_only_carried_groups() {
    let iget = Instruction::new(
        Opcode::Iget,
        Operands::TwoReference {
            a: Reg(2),
            b: Reg(3),
            reference: Reference::Field(FieldRef {
                class: "LFoo;".into(),
                name: "count".into(),
                field_type: "I".into(),
            }),
        },
    );
    assert_eq!(iget.registers(), vec![Reg(2), Reg(3)]);
    assert!(iget.reference().is_some());
    assert!(iget.reference2().is_none());
    assert!(iget.literal().is_none());
    assert!(iget.branch_offset().is_none());
    assert!(iget.table_index().is_none());
    assert_eq!(iget.code_units(), 2);
    assert_eq!(
        iget.capabilities(),
        Capabilities::REGISTERS | Capabilities::REFERENCE
    );
}

#[test]
fn variadic_registers_are_the_active_prefix() {
    let mut call = invoke(
        Opcode::InvokeVirtual,
        &[1, 2],
        method("LFoo;", "bar", &["I"], "V"),
    );
    if let Operands::Invoke { args, .. } = &mut call.operands {
        // Padding slots are never read.
        args.registers[4] = Reg(9);
    }
    assert_eq!(call.registers(), vec![Reg(1), Reg(2)]);
    assert_eq!(call.register_layout(), RegisterLayout::Variadic);
}

#[test]
fn polymorphic_carries_two_references() {
    let call = Instruction::new(
        Opcode::InvokePolymorphic,
        Operands::InvokePolymorphic {
            args: ArgList::new(&[Reg(0), Reg(1)]).unwrap(),
            method: method(
                "Ljava/lang/invoke/MethodHandle;",
                "invoke",
                &["[Ljava/lang/Object;"],
                "Ljava/lang/Object;",
            ),
            proto: Reference::MethodProto(ProtoRef {
                parameters: vec!["I".into()],
                return_type: "V".into(),
            }),
        },
    );
    assert!(call.is_well_formed());
    assert_eq!(call.code_units(), 4);
    assert!(call.capabilities().contains(Capabilities::REFERENCE2));
    assert_eq!(
        call.reference2().map(Reference::kind),
        Opcode::InvokePolymorphic.reference_type2()
    );
}

#[test]
fn instruction_yaml_shape() {
    let insn = Instruction::new(
        Opcode::AddIntLit8,
        Operands::TwoLiteral {
            a: Reg(0),
            b: Reg(1),
            literal: Literal::Narrow(3),
        },
    );
    let yaml = serde_yaml::to_string(&insn).unwrap();
    assert!(yaml.contains("opcode: add-int/lit8"), "{yaml}");
    assert!(yaml.contains("shape: two_literal"), "{yaml}");
    let back: Instruction = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, insn);
}
