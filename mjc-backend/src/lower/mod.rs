//! Lowering of method bodies to target instructions
//!
//! One [`BodyLowering`] exists per procedure being generated. It owns the
//! instruction buffer, consults the frame layout and class table for
//! addresses, and draws branch labels from the unit's [`Namer`].
//!
//! Register discipline:
//! - every expression leaves its value in [`CallingConvention::RESULT`]
//! - a left operand waiting for its right operand lives in a scratch register
//!   chosen by nesting depth, or on the stack when the right operand may call
//!   (or the scratch registers are exhausted)
//! - scratch registers still live at a call site are saved around the call
//!
//! Every push a body performs is popped before the body ends, so the stack
//! pointer seen by the epilogue is the one the prologue left.

mod call;
mod control;
mod entry;
mod expr;
mod method;
mod stmt;

pub use entry::lower_entry;
pub use method::lower_method;

use crate::classes::ClassTable;
use crate::naming::Namer;
use crate::LoweringOptions;
use log::{debug, trace};
use mjc_codegen::{CallingConvention, DataEntry, FrameLayout, Inst, Reg};
use mjc_common::CodegenError;

/// Instructions and data requirements of one generated procedure
pub struct LoweredProcedure {
    pub label: String,
    pub body: Vec<Inst>,
    pub data: Vec<DataEntry>,
}

pub(crate) struct BodyLowering<'a> {
    classes: &'a ClassTable<'a>,
    namer: &'a mut Namer,
    options: &'a LoweringOptions,

    /// Frame of the method being lowered; `None` for the entry procedure
    layout: Option<&'a FrameLayout>,

    /// Class whose fields are visible through the receiver
    class: &'a str,

    /// Qualified name used in diagnostics
    method: String,

    code: Vec<Inst>,
    data: Vec<DataEntry>,

    /// Scratch registers currently holding a waiting left operand
    live: Vec<Reg>,

    /// Words pushed by this body and not yet popped
    pushed: usize,
}

impl<'a> BodyLowering<'a> {
    pub(crate) fn new(
        classes: &'a ClassTable<'a>,
        namer: &'a mut Namer,
        options: &'a LoweringOptions,
        layout: Option<&'a FrameLayout>,
        class: &'a str,
        method: String,
    ) -> Self {
        Self {
            classes,
            namer,
            options,
            layout,
            class,
            method,
            code: Vec::new(),
            data: Vec::new(),
            live: Vec::new(),
            pushed: 0,
        }
    }

    fn emit(&mut self, inst: Inst) {
        self.code.push(inst);
    }

    fn emit_all(&mut self, insts: impl IntoIterator<Item = Inst>) {
        self.code.extend(insts);
    }

    fn comment(&mut self, text: impl Into<String>) {
        if self.options.emit_comments {
            self.code.push(Inst::Comment(text.into()));
        }
    }

    fn define_label(&mut self, label: &str) -> Result<(), CodegenError> {
        let inst = self.namer.define(label)?;
        self.emit(inst);
        Ok(())
    }

    fn require_data(&mut self, entry: DataEntry) {
        if !self.data.contains(&entry) {
            self.data.push(entry);
        }
    }

    fn log_spill(&self, message: &str) {
        if self.options.trace_spills {
            debug!("{}: {}", self.method, message);
        } else {
            trace!("{}: {}", self.method, message);
        }
    }

    /// Push `reg` onto the stack
    fn spill(&mut self, reg: Reg) {
        self.log_spill(&format!("spill {} (depth {})", reg, self.pushed));
        self.emit_all(CallingConvention::push(reg));
        self.pushed += 1;
    }

    /// Pop the most recent spill into `reg`
    fn reload(&mut self, reg: Reg) {
        self.log_spill(&format!("reload {} (depth {})", reg, self.pushed));
        self.emit_all(CallingConvention::pop(reg));
        self.pushed -= 1;
    }

    /// Push the result register as an outgoing call word
    fn push_result(&mut self) {
        self.emit_all(CallingConvention::push(CallingConvention::RESULT));
        self.pushed += 1;
    }

    /// Drop `words` pushed words
    fn release(&mut self, words: usize) {
        if let Some(inst) = CallingConvention::release(words) {
            self.emit(inst);
        }
        self.pushed -= words;
    }

    /// Hand over the finished body. Fails if pushes and pops do not balance.
    fn finish(self, label: String) -> Result<LoweredProcedure, CodegenError> {
        if self.pushed != 0 || !self.live.is_empty() {
            return Err(CodegenError::Internal(format!(
                "{}: {} words left on the stack, {} scratch registers live",
                self.method,
                self.pushed,
                self.live.len()
            )));
        }
        Ok(LoweredProcedure { label, body: self.code, data: self.data })
    }
}
