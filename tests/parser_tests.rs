use std::path::Path;
use tracevis::parser::{parse_line, HartIdAllocator, Privilege, Timestamp};

#[test]
fn test_full_record_fields_are_trimmed() {
    let line = "  101000 82      M         0x00001000 csrr    a0, mhartid     #; comment";
    let parsed = parse_line(line, Timestamp::default()).unwrap();

    assert_eq!(parsed.stamp, Timestamp::new(101000, 82));
    assert_eq!(parsed.privilege, Privilege::Machine);
    assert_eq!(parsed.pc, "0x00001000");
    assert_eq!(parsed.instruction, "csrr");
    assert_eq!(parsed.args, "a0, mhartid");
    assert_eq!(parsed.disasm(), "csrr a0, mhartid");
}

#[test]
fn test_abbreviated_record_inherits_previous_stamp() {
    let full = parse_line("100 5 M 0x00001000 csrr a0, mhartid #", Timestamp::default()).unwrap();
    let acc = parse_line("   M 0x00001004 fmul.d ft0, ft1, ft2 #", full.stamp).unwrap();

    assert_eq!(acc.stamp, Timestamp::new(100, 5));
    assert_eq!(acc.instruction, "fmul.d");
    assert!(acc.inherited);
}

#[test]
fn test_numeric_privilege_levels() {
    let user = parse_line("1 1 0 0x00002000 addi a0, a0, 1 #", Timestamp::default()).unwrap();
    let sup = parse_line("1 1 1 0x00002000 addi a0, a0, 1 #", Timestamp::default()).unwrap();
    let mach = parse_line("1 1 3 0x00002000 addi a0, a0, 1 #", Timestamp::default()).unwrap();

    assert_eq!(user.privilege, Privilege::User);
    assert_eq!(sup.privilege, Privilege::Supervisor);
    assert_eq!(mach.privilege, Privilege::Machine);
}

#[test]
fn test_unmatched_lines() {
    for garbage in [
        "",
        "Simulation finished",
        "101000 82 M 0x00001000 csrr a0, mhartid",
        "M 0x00001000 csrr a0 #",
    ] {
        assert!(parse_line(garbage, Timestamp::default()).is_none(), "{:?}", garbage);
    }
}

#[test]
fn test_hart_id_from_filename() {
    let mut harts = HartIdAllocator::new();
    assert_eq!(harts.next_id(Path::new("trace_hart_7.dasm")), 7);
}

#[test]
fn test_hart_id_fallback() {
    let mut harts = HartIdAllocator::new();
    assert_eq!(harts.next_id(Path::new("trace.dasm")), 1);
}
