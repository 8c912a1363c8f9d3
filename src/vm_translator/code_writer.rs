//! # Code Writer
//!
//! Emits Hack assembly for parsed VM commands.
//!
//! ## Conventions
//!
//! - `R13` holds the target address while popping into a computed location.
//! - `R14`/`R15` hold the frame base and return address while unwinding a
//!   call frame.
//! - `static i` in file `Foo` becomes the assembler symbol `Foo.i`.
//! - VM labels are qualified with the current function: `(Foo.bar$LOOP)`.
//! - Comparison and call sites draw fresh labels (`CMP_k_*`, `RET_k`) from
//!   counters that live as long as the writer, so one output program never
//!   reuses a label even across input files.

use super::command::{ArithOp, Segment, VmCommand};

pub struct CodeWriter {
    asm: Vec<String>,
    /// Stem of the file being translated, qualifies `static` references.
    filename: String,
    /// Qualifies `label`/`goto`/`if-goto` before any `function` is seen.
    current_function: String,
    cmp_index: usize,
    ret_index: usize,
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeWriter {
    pub fn new() -> Self {
        Self {
            asm: Vec::new(),
            filename: String::new(),
            current_function: "Sys.init".to_string(),
            cmp_index: 0,
            ret_index: 0,
        }
    }

    /// Must be called before translating each input file.
    pub fn set_filename(&mut self, name: &str) {
        self.filename = name.to_string();
    }

    /// `SP = 256; call Sys.init 0`, prepended when translating a program
    /// directory.
    pub fn write_bootstrap(&mut self) {
        self.emit("@256");
        self.emit("D=A");
        self.emit("@SP");
        self.emit("M=D");
        self.write_call("Sys.init", 0);
    }

    pub fn write_command(&mut self, command: &VmCommand) {
        match command {
            VmCommand::Arithmetic(op) => self.write_arithmetic(*op),
            VmCommand::Push { segment, index } => self.write_push(*segment, *index),
            VmCommand::Pop { segment, index } => self.write_pop(*segment, *index),
            VmCommand::Label(label) => self.write_label(label),
            VmCommand::Goto(label) => self.write_goto(label),
            VmCommand::IfGoto(label) => self.write_if_goto(label),
            VmCommand::Function { name, locals } => self.write_function(name, *locals),
            VmCommand::Call { name, args } => self.write_call(name, *args),
            VmCommand::Return => self.write_return(),
        }
    }

    pub fn into_asm(self) -> Vec<String> {
        self.asm
    }

    fn emit(&mut self, line: impl Into<String>) {
        self.asm.push(line.into());
    }

    // === Arithmetic ===

    fn write_arithmetic(&mut self, op: ArithOp) {
        match op {
            ArithOp::Add => self.write_binary_op('+'),
            ArithOp::Sub => self.write_binary_op('-'),
            ArithOp::And => self.write_binary_op('&'),
            ArithOp::Or => self.write_binary_op('|'),
            ArithOp::Neg => self.write_unary_op('-'),
            ArithOp::Not => self.write_unary_op('!'),
            ArithOp::Eq => self.write_compare_op("JEQ"),
            ArithOp::Lt => self.write_compare_op("JLT"),
            ArithOp::Gt => self.write_compare_op("JGT"),
        }
    }

    fn write_binary_op(&mut self, op: char) {
        self.emit("@SP");
        self.emit("A=M-1");
        self.emit("D=M");
        self.emit("A=A-1");
        self.emit(format!("M=M{op}D"));
        self.emit("@SP");
        self.emit("M=M-1");
    }

    fn write_unary_op(&mut self, op: char) {
        self.emit("@SP");
        self.emit("A=M-1");
        self.emit(format!("M={op}M"));
    }

    /// Compute `M-D` of the two top slots, write `-1` (true) or `0` (false)
    /// into the second-from-top, then shrink the stack by one.
    fn write_compare_op(&mut self, jump: &str) {
        let k = self.cmp_index;
        self.cmp_index += 1;

        self.emit("@SP");
        self.emit("A=M-1");
        self.emit("D=M");
        self.emit("A=A-1");
        self.emit("D=M-D");
        self.emit(format!("@CMP_{k}_TRUE"));
        self.emit(format!("D;{jump}"));
        self.emit("@SP");
        self.emit("A=M-1");
        self.emit("A=A-1");
        self.emit("M=0");
        self.emit(format!("@CMP_{k}_END"));
        self.emit("0;JMP");
        self.emit(format!("(CMP_{k}_TRUE)"));
        self.emit("@SP");
        self.emit("A=M-1");
        self.emit("A=A-1");
        self.emit("M=-1");
        self.emit(format!("(CMP_{k}_END)"));
        self.emit("@SP");
        self.emit("M=M-1");
    }

    // === Memory access ===

    /// Base symbol of a segment. `pointer` and `temp` are the registers
    /// themselves; `static` is a per-file assembler symbol.
    fn segment_base(&self, segment: Segment, index: u16) -> String {
        match segment {
            Segment::Local => "LCL".to_string(),
            Segment::Argument => "ARG".to_string(),
            Segment::This => "THIS".to_string(),
            Segment::That => "THAT".to_string(),
            Segment::Pointer => "R3".to_string(),
            Segment::Temp => "R5".to_string(),
            Segment::Static => format!("{}.{}", self.filename, index),
            Segment::Constant => unreachable!("constant segment has no base"),
        }
    }

    fn write_push(&mut self, segment: Segment, index: u16) {
        if segment == Segment::Constant {
            self.emit(format!("@{index}"));
            self.emit("D=A");
            self.push_d();
            return;
        }

        let base = self.segment_base(segment, index);
        self.emit(format!("@{base}"));
        match segment {
            // The base register itself is the start of the block
            Segment::Pointer | Segment::Temp => self.emit("D=A"),
            _ => self.emit("D=M"),
        }
        if segment != Segment::Static {
            self.emit(format!("@{index}"));
            self.emit("A=A+D");
            self.emit("D=M");
        }
        self.push_d();
    }

    fn write_pop(&mut self, segment: Segment, index: u16) {
        let base = self.segment_base(segment, index);
        self.emit(format!("@{base}"));
        match segment {
            Segment::Pointer | Segment::Temp | Segment::Static => self.emit("D=A"),
            _ => self.emit("D=M"),
        }
        if segment != Segment::Static {
            self.emit(format!("@{index}"));
            self.emit("D=A+D");
        }

        // Target address parks in R13 while the top of stack is popped
        self.emit("@R13");
        self.emit("M=D");
        self.emit("@SP");
        self.emit("A=M-1");
        self.emit("D=M");
        self.emit("@R13");
        self.emit("A=M");
        self.emit("M=D");
        self.emit("@SP");
        self.emit("M=M-1");
    }

    /// `*SP = D; SP++`
    fn push_d(&mut self) {
        self.emit("@SP");
        self.emit("A=M");
        self.emit("M=D");
        self.emit("@SP");
        self.emit("M=M+1");
    }

    // === Program flow ===

    fn qualified_label(&self, label: &str) -> String {
        format!("{}${}", self.current_function, label)
    }

    fn write_label(&mut self, label: &str) {
        let qualified = self.qualified_label(label);
        self.emit(format!("({qualified})"));
    }

    fn write_goto(&mut self, label: &str) {
        let qualified = self.qualified_label(label);
        self.emit(format!("@{qualified}"));
        self.emit("0;JMP");
    }

    fn write_if_goto(&mut self, label: &str) {
        let qualified = self.qualified_label(label);
        self.emit("@SP");
        self.emit("M=M-1");
        self.emit("A=M");
        self.emit("D=M");
        self.emit(format!("@{qualified}"));
        self.emit("D;JNE");
    }

    // === Calling convention ===

    fn write_function(&mut self, name: &str, locals: u16) {
        self.current_function = name.to_string();
        self.emit(format!("({name})"));
        for _ in 0..locals {
            self.emit("@SP");
            self.emit("A=M");
            self.emit("M=0");
            self.emit("@SP");
            self.emit("M=M+1");
        }
    }

    /// Push the return address and the caller's `LCL`/`ARG`/`THIS`/`THAT`,
    /// reposition `ARG` under the arguments, then jump.
    fn write_call(&mut self, name: &str, args: u16) {
        let ret = format!("RET_{}", self.ret_index);
        self.ret_index += 1;

        self.emit(format!("@{ret}"));
        self.emit("D=A");
        self.push_d();
        for saved in ["LCL", "ARG", "THIS", "THAT"] {
            self.emit(format!("@{saved}"));
            self.emit("D=M");
            self.push_d();
        }
        // ARG = SP - args - 5
        self.emit("@SP");
        self.emit("D=M");
        self.emit(format!("@{}", args + 5));
        self.emit("D=D-A");
        self.emit("@ARG");
        self.emit("M=D");
        // LCL = SP
        self.emit("@SP");
        self.emit("D=M");
        self.emit("@LCL");
        self.emit("M=D");
        self.emit(format!("@{name}"));
        self.emit("0;JMP");
        self.emit(format!("({ret})"));
    }

    /// Copy the return value into `*ARG`, rewind `SP`, restore the caller's
    /// saved segment pointers from the frame, and jump to the return address.
    fn write_return(&mut self) {
        // FRAME = LCL (R14), RET = *(FRAME-5) (R15)
        self.emit("@LCL");
        self.emit("D=M");
        self.emit("@R14");
        self.emit("M=D");
        self.emit("@5");
        self.emit("A=D-A");
        self.emit("D=M");
        self.emit("@R15");
        self.emit("M=D");
        // *ARG = pop()
        self.emit("@SP");
        self.emit("A=M-1");
        self.emit("D=M");
        self.emit("@ARG");
        self.emit("A=M");
        self.emit("M=D");
        // SP = ARG + 1
        self.emit("@ARG");
        self.emit("D=M+1");
        self.emit("@SP");
        self.emit("M=D");
        // THAT = *(FRAME-1)
        self.emit("@R14");
        self.emit("A=M-1");
        self.emit("D=M");
        self.emit("@THAT");
        self.emit("M=D");
        // THIS = *(FRAME-2), ARG = *(FRAME-3), LCL = *(FRAME-4)
        for (offset, target) in [(2, "THIS"), (3, "ARG"), (4, "LCL")] {
            self.emit("@R14");
            self.emit("D=M");
            self.emit(format!("@{offset}"));
            self.emit("A=D-A");
            self.emit("D=M");
            self.emit(format!("@{target}"));
            self.emit("M=D");
        }
        // goto RET
        self.emit("@R15");
        self.emit("A=M");
        self.emit("0;JMP");
    }
}
