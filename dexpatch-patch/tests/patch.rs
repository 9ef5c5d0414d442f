mod common;

use std::sync::{Arc, Mutex};

use common::*;
use dexpatch_ir::*;
use dexpatch_isa::*;
use dexpatch_patch::*;

const CLASS: &str = "Lcom/example/Main;";

fn patcher(method: &str) -> Patcher {
    Patcher::new(PatchConfig::new(CLASS, method))
        .unwrap()
        .with_observer(NoopObserver)
}

fn patched_body(outcome: &PatchOutcome, index: usize) -> &MethodBody {
    outcome.program.classes[0].methods[index]
        .implementation
        .as_ref()
        .unwrap()
}

#[test]
fn only_parameter_register_is_shifted() {
    // static void run(int): registers = 1, p0 = v0
    let m = body(1, 1, vec![mv(0, 0)]);
    let out = transform(&m).unwrap();
    assert_eq!(out.registers, 2);
    assert_eq!(out.instructions, vec![mv(1, 1)]);

    let prog = program(
        CLASS,
        vec![method("run", &["I"], AccessFlags::STATIC, Some(m))],
    );
    let outcome = patcher("run").patch_program(&prog).unwrap();
    let patched = patched_body(&outcome, 0);
    assert_eq!(patched.registers, 2);
    assert_eq!(patched.parameter_registers, 1);
    let listing: Vec<String> = patched.instructions.iter().map(|i| i.to_string()).collect();
    assert_eq!(
        listing,
        vec![
            "const-string v0, \"gadget\"",
            "invoke-static {v0}, Ljava/lang/System;->loadLibrary(Ljava/lang/String;)V",
            "move v1, v1",
        ]
    );

    let summary = &outcome.patched[0];
    assert!(summary.added_register);
    assert_eq!(summary.shifted, 1);
    assert_eq!((summary.registers_before, summary.registers_after), (1, 2));
    assert_eq!(summary.code_units_after, summary.code_units_before + 5);
}

#[test]
fn existing_local_is_reused() {
    let m = body(2, 1, vec![mv(0, 1)]);
    assert!(!needs_extra_register(2, 1));
    assert_eq!(transform(&m).unwrap(), m);

    let prog = program(
        CLASS,
        vec![method("run", &["I"], AccessFlags::STATIC, Some(m))],
    );
    let outcome = patcher("run").patch_program(&prog).unwrap();
    let patched = patched_body(&outcome, 0);
    assert_eq!(patched.registers, 2);
    assert_eq!(patched.instructions.len(), 3);
    assert_eq!(patched.instructions[0].operands.registers(), vec![PREAMBLE_REGISTER]);
    assert_eq!(patched.instructions[2], mv(0, 1));
    assert!(!outcome.patched[0].added_register);
    assert_eq!(outcome.patched[0].shifted, 0);
}

#[test]
fn renumbering_twice_changes_addressing() {
    let m = body(1, 1, vec![mv(0, 0)]);
    let once = renumber(&m).unwrap();
    let twice = renumber(&once).unwrap();
    // The second pass shifts already shifted operands and grows the window again.
    assert_ne!(twice, once);
    assert_eq!(twice.instructions, vec![mv(2, 2)]);
    assert_eq!(twice.registers, 3);

    let prog = program(
        CLASS,
        vec![method("run", &["I"], AccessFlags::STATIC, Some(m))],
    );
    let p = patcher("run");
    let first = p.patch_program(&prog).unwrap();
    let second = p.patch_program(&first.program).unwrap();
    assert_ne!(first.program, second.program);
    assert_eq!(patched_body(&second, 0).instructions.len(), 5);
}

#[test]
fn every_overload_is_patched() {
    let prog = program(
        CLASS,
        vec![
            method("run", &["I"], AccessFlags::STATIC, Some(body(1, 1, vec![mv(0, 0)]))),
            method("run", &["J"], AccessFlags::STATIC, Some(body(3, 2, vec![mv(0, 1)]))),
            method("other", &[], AccessFlags::STATIC, Some(body(1, 0, vec![]))),
        ],
    );
    let outcome = patcher("run").patch_program(&prog).unwrap();
    assert_eq!(outcome.patched.len(), 2);
    assert_eq!(patched_body(&outcome, 0).instructions.len(), 3);
    assert_eq!(patched_body(&outcome, 1).instructions.len(), 3);
    assert_eq!(patched_body(&outcome, 2).instructions.len(), 0);
    // input untouched
    assert_eq!(prog.classes[0].methods[0].implementation.as_ref().unwrap().registers, 1);
}

#[test]
fn missing_method_policy() {
    let prog = program(
        CLASS,
        vec![method("run", &[], AccessFlags::STATIC, Some(body(1, 0, vec![])))],
    );

    let outcome = patcher("absent").patch_program(&prog).unwrap();
    assert!(outcome.is_unchanged());
    assert_eq!(outcome.program, prog);

    let mut config = PatchConfig::new(CLASS, "absent");
    config.on_missing = MissingMethod::Error;
    let err = Patcher::new(config)
        .unwrap()
        .with_observer(NoopObserver)
        .patch_program(&prog)
        .unwrap_err();
    assert!(matches!(err, Error::MethodNotFound { .. }), "{err}");

    let mut config = PatchConfig::new("LOther;", "run");
    config.on_missing = MissingMethod::Error;
    assert!(patch_program(&prog, config).is_err());
}

#[test]
fn methods_without_code_are_skipped() {
    let recorder = Recorder::default();
    let prog = program(
        CLASS,
        vec![method("run", &[], AccessFlags::PUBLIC | AccessFlags::NATIVE, None)],
    );
    let mut config = PatchConfig::new(CLASS, "run");
    config.on_missing = MissingMethod::Error;
    let outcome = Patcher::new(config)
        .unwrap()
        .with_observer(recorder.clone())
        .patch_program(&prog)
        .unwrap();
    assert!(outcome.is_unchanged());
    assert_eq!(recorder.events(), vec!["matched", "skipped"]);
}

#[test]
fn inconsistent_register_counts_are_rejected() {
    let prog = program(
        CLASS,
        vec![method("run", &["I", "I"], AccessFlags::STATIC, Some(body(1, 2, vec![])))],
    );
    let err = patcher("run").patch_program(&prog).unwrap_err();
    assert!(
        matches!(err, Error::InconsistentRegisters { registers: 1, parameters: 2, .. }),
        "{err}"
    );
}

#[test]
fn malformed_instruction_aborts_the_method() {
    let bad = Instruction::new(Opcode::Move, Operands::One { a: Reg(0) });
    let prog = program(
        CLASS,
        vec![method("run", &["I"], AccessFlags::STATIC, Some(body(1, 1, vec![mv(0, 0), bad])))],
    );
    let err = patcher("run").patch_program(&prog).unwrap_err();
    assert!(matches!(err, Error::MalformedInstruction { index: 1, .. }), "{err}");
}

#[test]
fn observer_sees_each_step() {
    let recorder = Recorder::default();
    let prog = program(
        CLASS,
        vec![
            method("run", &["I"], AccessFlags::STATIC, Some(body(1, 1, vec![mv(0, 0)]))),
            method("run", &[], AccessFlags::STATIC, Some(body(1, 0, vec![]))),
        ],
    );
    Patcher::new(PatchConfig::new(CLASS, "run"))
        .unwrap()
        .with_observer(recorder.clone())
        .patch_program(&prog)
        .unwrap();
    assert_eq!(
        recorder.events(),
        vec![
            "matched",
            "register_added",
            "shifted",
            "preamble",
            "matched",
            "register_reused",
            "preamble",
        ]
    );

    let recorder = Recorder::default();
    Patcher::new(PatchConfig::new(CLASS, "absent"))
        .unwrap()
        .with_observer(recorder.clone())
        .patch_program(&prog)
        .unwrap();
    assert_eq!(recorder.events(), vec!["not_found"]);
}

#[test]
fn custom_library_and_loader() {
    let mut config = PatchConfig::new(CLASS, "run");
    config.library = "frida-gadget".into();
    config.loader = MethodRef::new("LBoot;", "load", ["Ljava/lang/String;"], "V");
    let prog = program(
        CLASS,
        vec![method("run", &[], AccessFlags::STATIC, Some(body(1, 0, vec![])))],
    );
    let outcome = Patcher::new(config)
        .unwrap()
        .with_observer(NoopObserver)
        .patch_program(&prog)
        .unwrap();
    let listing: Vec<String> = patched_body(&outcome, 0)
        .instructions
        .iter()
        .map(|i| i.to_string())
        .collect();
    assert_eq!(
        listing,
        vec![
            "const-string v0, \"frida-gadget\"",
            "invoke-static {v0}, LBoot;->load(Ljava/lang/String;)V",
        ]
    );
}

#[test]
fn tries_and_debug_info_pass_through() {
    let mut m = body(2, 2, vec![mv(0, 1)]);
    m.tries.push(TryBlock {
        start_address: 0,
        code_units: 1,
        handlers: vec![ExceptionHandler {
            exception_type: None,
            handler_address: 1,
        }],
    });
    m.debug_items.push(DebugItem {
        address: 0,
        kind: DebugKind::LineNumber { line: 42 },
    });
    let out = transform(&m).unwrap();
    assert_eq!(out.tries, m.tries);
    assert_eq!(out.debug_items, m.debug_items);
}

#[test]
fn parallel_transform_matches_sequential() {
    let bodies: Vec<MethodBody> = (1..40u16)
        .map(|n| body(n % 5 + 1, 1, vec![mv(0, 0), mv(n % 5, 0)]))
        .collect();
    let results = transform_all(&bodies);
    for (input, result) in bodies.iter().zip(results) {
        assert_eq!(result.unwrap(), transform(input).unwrap());
    }
}

struct YamlCodec;

impl ProgramDecoder for YamlCodec {
    type Error = serde_yaml::Error;

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Program, Self::Error> {
        serde_yaml::from_slice(bytes)
    }
}

impl ProgramEncoder for YamlCodec {
    type Error = serde_yaml::Error;

    fn encode(&self, program: &Program) -> std::result::Result<Vec<u8>, Self::Error> {
        serde_yaml::to_string(program).map(String::into_bytes)
    }
}

#[test]
fn image_round_trip_through_codec() {
    let prog = program(
        CLASS,
        vec![method("run", &["I"], AccessFlags::STATIC, Some(body(1, 1, vec![mv(0, 0)])))],
    );
    let bytes = YamlCodec.encode(&prog).unwrap();
    let (image, patched) = patcher("run").patch_image(&YamlCodec, &YamlCodec, &bytes).unwrap();
    assert_eq!(patched.len(), 1);
    let decoded = YamlCodec.decode(&image).unwrap();
    assert_eq!(decoded.classes[0].methods[0].implementation.as_ref().unwrap().registers, 2);

    let err = patcher("run")
        .patch_image(&YamlCodec, &YamlCodec, b"classes: 12")
        .unwrap_err();
    assert!(matches!(err, Error::Codec(_)), "{err}");
}

#[test]
fn several_classes_in_one_run() {
    const APP: &str = "Lcom/example/App;";
    let ctor = AccessFlags::PUBLIC | AccessFlags::CONSTRUCTOR;
    let prog = programs(vec![
        (
            CLASS,
            vec![method("onCreate", &[], AccessFlags::PUBLIC, Some(body(2, 1, vec![])))],
        ),
        (
            APP,
            vec![
                method("<init>", &[], ctor, Some(body(1, 1, vec![mv(0, 0)]))),
                method("helper", &[], AccessFlags::PUBLIC, Some(body(1, 1, vec![]))),
            ],
        ),
    ]);
    let config = PatchConfig::with_targets(vec![
        Target::method(CLASS, "onCreate"),
        Target::constructors(APP),
    ]);
    let outcome = Patcher::new(config)
        .unwrap()
        .with_observer(NoopObserver)
        .patch_program(&prog)
        .unwrap();

    let names: Vec<(&str, &str)> = outcome
        .patched
        .iter()
        .map(|m| (m.class.as_str(), m.name.as_str()))
        .collect();
    assert_eq!(names, vec![(CLASS, "onCreate"), (APP, "<init>")]);
    let app = &outcome.program.classes[1];
    assert_eq!(app.methods[0].implementation.as_ref().unwrap().registers, 2);
    assert!(app.methods[1].implementation.as_ref().unwrap().instructions.is_empty());
}

#[test]
fn constructors_are_selected_by_access_flag() {
    let prog = program(
        CLASS,
        vec![
            method("run", &[], AccessFlags::PUBLIC, Some(body(1, 1, vec![]))),
            method(
                "<clinit>",
                &[],
                AccessFlags::STATIC | AccessFlags::CONSTRUCTOR,
                Some(body(1, 0, vec![])),
            ),
            method(
                "<init>",
                &["I"],
                AccessFlags::PUBLIC | AccessFlags::CONSTRUCTOR,
                Some(body(2, 2, vec![mv(0, 1)])),
            ),
        ],
    );
    let config = PatchConfig::with_targets(vec![Target::constructors(CLASS)]);
    let outcome = Patcher::new(config)
        .unwrap()
        .with_observer(NoopObserver)
        .patch_program(&prog)
        .unwrap();
    let names: Vec<&str> = outcome.patched.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["<clinit>", "<init>"]);
    assert!(patched_body(&outcome, 0).instructions.is_empty());
    assert_eq!(patched_body(&outcome, 2).instructions[2], mv(1, 2));
}

#[test]
fn overlapping_targets_patch_once() {
    let prog = program(
        CLASS,
        vec![method(
            "<init>",
            &[],
            AccessFlags::PUBLIC | AccessFlags::CONSTRUCTOR,
            Some(body(1, 1, vec![])),
        )],
    );
    let config = PatchConfig::with_targets(vec![
        Target::constructors(CLASS),
        Target::method(CLASS, "<init>"),
    ]);
    let outcome = Patcher::new(config)
        .unwrap()
        .with_observer(NoopObserver)
        .patch_program(&prog)
        .unwrap();
    assert_eq!(outcome.patched.len(), 1);
    assert_eq!(patched_body(&outcome, 0).instructions.len(), 2);
}

#[test]
fn strict_policy_names_the_missing_target() {
    let prog = program(
        CLASS,
        vec![method("run", &[], AccessFlags::STATIC, Some(body(1, 0, vec![])))],
    );
    let mut config = PatchConfig::with_targets(vec![
        Target::method(CLASS, "run"),
        Target::constructors("LAbsent;"),
    ]);
    config.on_missing = MissingMethod::Error;
    let err = Patcher::new(config)
        .unwrap()
        .with_observer(NoopObserver)
        .patch_program(&prog)
        .unwrap_err();
    match err {
        Error::MethodNotFound { class, method } => {
            assert_eq!(class, "LAbsent;");
            assert_eq!(method, "<constructor>");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn skip_reason_follows_access_flags() {
    let reasons = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reasons);
    let prog = program(
        CLASS,
        vec![
            method("run", &[], AccessFlags::PUBLIC | AccessFlags::ABSTRACT, None),
            method("run", &["I"], AccessFlags::PUBLIC, None),
        ],
    );
    Patcher::new(PatchConfig::new(CLASS, "run"))
        .unwrap()
        .with_observer(move |e: &PatchEvent<'_>| {
            if let PatchEvent::MethodSkipped { reason, .. } = e {
                sink.lock().unwrap().push(*reason);
            }
        })
        .patch_program(&prog)
        .unwrap();
    assert_eq!(
        *reasons.lock().unwrap(),
        vec![SkipReason::NoImplementation, SkipReason::MissingCode]
    );
}

#[test]
fn parameter_count_mismatch_goes_to_observer() {
    let recorder = Recorder::default();
    // static run(J) needs two parameter registers, the body declares one
    let prog = program(
        CLASS,
        vec![method("run", &["J"], AccessFlags::STATIC, Some(body(2, 1, vec![])))],
    );
    Patcher::new(PatchConfig::new(CLASS, "run"))
        .unwrap()
        .with_observer(recorder.clone())
        .patch_program(&prog)
        .unwrap();
    assert_eq!(
        recorder.events(),
        vec!["matched", "parameter_mismatch", "register_reused", "preamble"]
    );
}
