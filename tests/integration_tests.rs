use std::fs;

use hack_toolchain::assembler::{assemble, to_binary_lines};
use hack_toolchain::parser::parse;
use hack_toolchain::scope::annotate;
use hack_toolchain::tokenizer::tokenize;
use hack_toolchain::vm_translator::{parse_commands, CodeWriter};
use hack_toolchain::vm_writer::write_vm;

/// Run tokenizer → parser → annotator → VM writer, asserting no errors.
fn compile_jack(source: &str) -> Vec<String> {
    let lexed = tokenize(source);
    assert!(lexed.errors.is_empty(), "Lexer errors: {:?}", lexed.errors);
    let mut ast = parse(&lexed.tokens).expect("parse failed");
    annotate(&mut ast).expect("annotation failed");
    write_vm(&ast).expect("codegen failed")
}

fn compile_jack_file(path: &str) -> Vec<String> {
    let source = fs::read_to_string(path).expect("Failed to read test program");
    compile_jack(&source)
}

/// Translate named in-memory `.vm` sources into one assembly listing.
fn translate_vm(files: &[(&str, &str)], bootstrap: bool) -> Vec<String> {
    let mut writer = CodeWriter::new();
    if bootstrap {
        writer.write_bootstrap();
    }
    for (name, source) in files {
        let parsed = parse_commands(source);
        assert!(
            parsed.errors.is_empty(),
            "Parse errors in {}: {:?}",
            name,
            parsed.errors
        );
        writer.set_filename(name);
        for command in &parsed.commands {
            writer.write_command(&command.kind);
        }
    }
    writer.into_asm()
}

fn assemble_ok(source: &str) -> Vec<u16> {
    let result = assemble(source);
    assert!(
        result.errors.is_empty(),
        "Assembler errors: {:?}",
        result.errors
    );
    result.machine_code
}

// ========== JACK COMPILER ==========

#[test]
fn minimal_class_compiles_to_expected_listing() {
    let code = compile_jack_file("tests/test_programs/Main.jack");
    assert_eq!(
        code,
        vec![
            "function Main.main 0",
            "push constant 1",
            "push constant 2",
            "add",
            "call Output.printInt 1",
            "pop temp 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn bare_call_inside_class_targets_this() {
    let code = compile_jack(
        "class C { method void f() { var int x; do foo(x); return; } \
                   method void foo(int n) { return; } }",
    );
    let call_at = code.iter().position(|l| l == "push pointer 0").unwrap();
    assert_eq!(code[call_at + 1], "push local 0");
    assert_eq!(code[call_at + 2], "call C.foo 2");
    assert_eq!(code[call_at + 3], "pop temp 0");
}

#[test]
fn counter_class_compiles() {
    let code = compile_jack_file("tests/test_programs/Counter.jack");

    // Constructor allocates both fields and anchors this
    let new_at = code
        .iter()
        .position(|l| l == "function Counter.new 0")
        .unwrap();
    assert_eq!(code[new_at + 1], "push constant 2");
    assert_eq!(code[new_at + 2], "call Memory.alloc 1");
    assert_eq!(code[new_at + 3], "pop pointer 0");

    // Statics hit the static segment
    assert!(code.contains(&"push static 0".to_string()));
    assert!(code.contains(&"pop static 0".to_string()));

    // Methods anchor this from argument 0
    let inc_at = code
        .iter()
        .position(|l| l == "function Counter.inc 0")
        .unwrap();
    assert_eq!(code[inc_at + 1], "push argument 0");
    assert_eq!(code[inc_at + 2], "pop pointer 0");

    // incBy's parameter lives at argument 1 (argument 0 is the receiver)
    let inc_by_at = code
        .iter()
        .position(|l| l == "function Counter.incBy 0")
        .unwrap();
    assert!(code[inc_by_at..].contains(&"push argument 1".to_string()));

    // The while loop in incBy and the if in inc both emit label pairs
    assert!(code.contains(&"label L_WHILE_0_START".to_string()));
    assert!(code.contains(&"label L_WHILE_0_END".to_string()));
    assert!(code.contains(&"label L_IF_0_ELSE".to_string()));
    assert!(code.contains(&"label L_IF_0_ENDIF".to_string()));
}

/// Every line the compiler emits must be a well-formed VM instruction.
#[test]
fn compiler_output_reparses_as_vm() {
    for fixture in [
        "tests/test_programs/Main.jack",
        "tests/test_programs/Counter.jack",
    ] {
        let code = compile_jack_file(fixture);
        let parsed = parse_commands(&code.join("\n"));
        assert!(
            parsed.errors.is_empty(),
            "{} produced invalid VM code: {:?}",
            fixture,
            parsed.errors
        );
        assert_eq!(parsed.commands.len(), code.len());
    }
}

// ========== CLOSED PIPELINE ==========

#[test]
fn jack_to_hack_pipeline_closes() {
    let vm_code = compile_jack_file("tests/test_programs/Counter.jack");
    let asm = translate_vm(&[("Counter", &vm_code.join("\n"))], false);
    let machine_code = assemble_ok(&asm.join("\n"));

    for line in to_binary_lines(&machine_code) {
        assert_eq!(line.len(), 16);
        assert!(line.chars().all(|c| c == '0' || c == '1'));
    }
}

#[test]
fn artifacts_round_trip_through_disk() {
    let dir = tempfile::tempdir().expect("tempdir");

    let vm_code = compile_jack_file("tests/test_programs/Main.jack");
    let vm_path = dir.path().join("Main.vm");
    fs::write(&vm_path, vm_code.join("\n") + "\n").unwrap();

    let vm_source = fs::read_to_string(&vm_path).unwrap();
    let asm = translate_vm(&[("Main", &vm_source)], false);
    let asm_path = dir.path().join("Main.asm");
    fs::write(&asm_path, asm.join("\n") + "\n").unwrap();

    let asm_source = fs::read_to_string(&asm_path).unwrap();
    let machine_code = assemble_ok(&asm_source);
    assert!(!machine_code.is_empty());
}

// ========== VM TRANSLATOR EXECUTION ==========

#[test]
fn simple_add_executes() {
    let source = fs::read_to_string("tests/test_programs/SimpleAdd.vm").unwrap();
    let asm = translate_vm(&[("SimpleAdd", &source)], false);
    let rom = assemble_ok(&asm.join("\n"));

    let mut machine = hack_machine::Machine::new(rom);
    machine.ram[0] = 256; // SP
    machine.run(1_000);

    assert_eq!(machine.ram[256], 15);
    assert_eq!(machine.ram[0], 257);
}

#[test]
fn comparisons_execute() {
    let source = fs::read_to_string("tests/test_programs/StackTest.vm").unwrap();
    let asm = translate_vm(&[("StackTest", &source)], false);
    let rom = assemble_ok(&asm.join("\n"));

    let mut machine = hack_machine::Machine::new(rom);
    machine.ram[0] = 256;
    machine.run(1_000);

    assert_eq!(machine.ram[0], 259);
    assert_eq!(machine.ram[256], 0xFFFF, "17 = 17 is true");
    assert_eq!(machine.ram[257], 0, "892 < 891 is false");
    assert_eq!(machine.ram[258], 0xFFFF, "32767 > 0 is true");
}

#[test]
fn calling_convention_executes() {
    let sys = fs::read_to_string("tests/test_programs/Sys.vm").unwrap();
    let main = fs::read_to_string("tests/test_programs/MainDouble.vm").unwrap();
    let asm = translate_vm(&[("Sys", &sys), ("MainDouble", &main)], true);
    let rom = assemble_ok(&asm.join("\n"));

    let mut machine = hack_machine::Machine::new(rom);
    machine.run(10_000);

    // Sys.init pushed 4; Main.double returned 8 in its place at the top of
    // Sys.init's working stack (above the bootstrap call frame)
    let sp = machine.ram[0] as usize;
    assert_eq!(machine.ram[sp - 1], 8);
    assert_eq!(sp, 262);
}

#[test]
fn branching_executes() {
    // Sums 1..=5 with a loop driven by if-goto
    let source = "\
function Sys.init 2
push constant 5
pop local 0
push constant 0
pop local 1
label LOOP
push local 0
if-goto BODY
goto DONE
label BODY
push local 1
push local 0
add
pop local 1
push local 0
push constant 1
sub
pop local 0
goto LOOP
label DONE
push local 1
label END
goto END
";
    let asm = translate_vm(&[("Sum", source)], true);
    let rom = assemble_ok(&asm.join("\n"));

    let mut machine = hack_machine::Machine::new(rom);
    machine.run(10_000);

    let sp = machine.ram[0] as usize;
    assert_eq!(machine.ram[sp - 1], 15);
}

// ========== ASSEMBLER ==========

#[test]
fn max_program_assembles() {
    let source = fs::read_to_string("tests/test_programs/Max.asm").unwrap();
    let code = assemble_ok(&source);

    assert_eq!(code.len(), 16);
    assert_eq!(code[0], 0); // @R0
    assert_eq!(code[1], 0b1111110000010000); // D=M
    assert_eq!(code[2], 1); // @R1
    assert_eq!(code[4], 10); // @OUTPUT_FIRST
    assert_eq!(code[8], 12); // @OUTPUT_D
    assert_eq!(code[14], 14); // @INFINITE_LOOP
    assert_eq!(code[15], 0b1110101010000111); // 0;JMP
}

#[test]
fn max_program_executes() {
    let source = fs::read_to_string("tests/test_programs/Max.asm").unwrap();
    let rom = assemble_ok(&source);

    let mut machine = hack_machine::Machine::new(rom.clone());
    machine.ram[0] = 23;
    machine.ram[1] = 45;
    machine.run(100);
    assert_eq!(machine.ram[2], 45);

    let mut machine = hack_machine::Machine::new(rom);
    machine.ram[0] = 99;
    machine.ram[1] = 12;
    machine.run(100);
    assert_eq!(machine.ram[2], 99);
}

/// C-instructions survive an encode/decode round trip.
#[test]
fn generated_c_instructions_round_trip() {
    for fixture in [
        "tests/test_programs/SimpleAdd.vm",
        "tests/test_programs/StackTest.vm",
    ] {
        let source = fs::read_to_string(fixture).unwrap();
        let asm = translate_vm(&[("Test", &source)], false);
        for line in &asm {
            if line.starts_with('@') || line.starts_with('(') {
                continue;
            }
            let word = assemble_ok(line)[0];
            assert_eq!(
                &hack_machine::disassemble_c(word),
                line,
                "round trip failed for {line}"
            );
        }
    }
}

// ========== TEST SUPPORT ==========

/// A minimal Hack CPU interpreter, enough to observe the memory effects of
/// assembled programs.
mod hack_machine {
    pub struct Machine {
        rom: Vec<u16>,
        pub ram: Vec<u16>,
        a: u16,
        d: u16,
        pc: usize,
    }

    impl Machine {
        pub fn new(rom: Vec<u16>) -> Self {
            Machine {
                rom,
                ram: vec![0; 32768],
                a: 0,
                d: 0,
                pc: 0,
            }
        }

        /// Execute at most `steps` instructions; stops when the program
        /// counter runs off the end of the ROM.
        pub fn run(&mut self, steps: usize) {
            for _ in 0..steps {
                if self.pc >= self.rom.len() {
                    return;
                }
                self.step(self.rom[self.pc]);
            }
        }

        fn step(&mut self, instr: u16) {
            if instr & 0x8000 == 0 {
                self.a = instr;
                self.pc += 1;
                return;
            }

            let select_m = instr & 0x1000 != 0;
            let c = (instr >> 6) & 0x3F;
            let dest = (instr >> 3) & 0b111;
            let jump = instr & 0b111;

            let y = if select_m {
                self.ram[self.a as usize]
            } else {
                self.a
            };
            let out = alu(self.d, y, c);

            // M is written at the pre-instruction address
            if dest & 0b001 != 0 {
                self.ram[self.a as usize] = out;
            }
            if dest & 0b010 != 0 {
                self.d = out;
            }
            if dest & 0b100 != 0 {
                self.a = out;
            }

            let out = out as i16;
            let taken = match jump {
                0b000 => false,
                0b001 => out > 0,
                0b010 => out == 0,
                0b011 => out >= 0,
                0b100 => out < 0,
                0b101 => out != 0,
                0b110 => out <= 0,
                _ => true,
            };
            if taken {
                self.pc = self.a as usize;
            } else {
                self.pc += 1;
            }
        }
    }

    /// The ALU control bits, in order: zx nx zy ny f no.
    fn alu(mut x: u16, mut y: u16, c: u16) -> u16 {
        if c & 0b100000 != 0 {
            x = 0;
        }
        if c & 0b010000 != 0 {
            x = !x;
        }
        if c & 0b001000 != 0 {
            y = 0;
        }
        if c & 0b000100 != 0 {
            y = !y;
        }
        let mut out = if c & 0b000010 != 0 {
            x.wrapping_add(y)
        } else {
            x & y
        };
        if c & 0b000001 != 0 {
            out = !out;
        }
        out
    }

    /// Reverse of the C-instruction encoding, for round-trip checks.
    pub fn disassemble_c(word: u16) -> String {
        let comp = match (word >> 6) & 0x7F {
            0b0101010 => "0",
            0b0111111 => "1",
            0b0111010 => "-1",
            0b0001100 => "D",
            0b0110000 => "A",
            0b1110000 => "M",
            0b0001101 => "!D",
            0b0110001 => "!A",
            0b1110001 => "!M",
            0b0001111 => "-D",
            0b0110011 => "-A",
            0b1110011 => "-M",
            0b0011111 => "D+1",
            0b0110111 => "A+1",
            0b1110111 => "M+1",
            0b0001110 => "D-1",
            0b0110010 => "A-1",
            0b1110010 => "M-1",
            0b0000010 => "D+A",
            0b1000010 => "D+M",
            0b0010011 => "D-A",
            0b1010011 => "D-M",
            0b0000111 => "A-D",
            0b1000111 => "M-D",
            0b0000000 => "D&A",
            0b1000000 => "D&M",
            0b0010101 => "D|A",
            0b1010101 => "D|M",
            other => panic!("unknown comp bits {other:07b}"),
        };
        let dest = match (word >> 3) & 0b111 {
            0b000 => "",
            0b001 => "M=",
            0b010 => "D=",
            0b011 => "MD=",
            0b100 => "A=",
            0b101 => "AM=",
            0b110 => "AD=",
            _ => "AMD=",
        };
        let jump = match word & 0b111 {
            0b000 => "",
            0b001 => ";JGT",
            0b010 => ";JEQ",
            0b011 => ";JGE",
            0b100 => ";JLT",
            0b101 => ";JNE",
            0b110 => ";JLE",
            _ => ";JMP",
        };
        format!("{dest}{comp}{jump}")
    }
}
