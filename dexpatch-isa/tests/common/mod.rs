#![allow(dead_code)]

use dexpatch_isa::*;

pub fn method(class: &str, name: &str, params: &[&str], ret: &str) -> Reference {
    Reference::Method(MethodRef::new(class, name, params.iter().copied(), ret))
}

pub fn invoke(opcode: Opcode, args: &[u16], reference: Reference) -> Instruction {
    let regs: Vec<Reg> = args.iter().map(|&r| Reg(r)).collect();
    Instruction::new(
        opcode,
        Operands::Invoke {
            args: ArgList::new(&regs).unwrap(),
            reference,
        },
    )
}
