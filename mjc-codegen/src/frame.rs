//! Stack Frame Layout
//!
//! Plans the activation record of one method and generates its prologue and
//! epilogue. All slots are addressed as negative offsets from `$fp`, which
//! holds the caller's `$sp` at entry (the high end of the frame).
//!
//! Layout, from `$fp` downward:
//! 1. Saved-register block, in [`CallingConvention::saved_registers`] order
//! 2. Parameters, in declaration order
//! 3. Locals, in declaration order
//! 4. Padding up to [`CallingConvention::STACK_ALIGN`]

use crate::abi::CallingConvention;
use crate::asm::{Inst, Reg};
use log::debug;
use mjc_common::{CodegenError, MethodDescriptor};
use std::collections::HashMap;

/// Frame layout of one method. Read-only once planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    object_scoped: bool,

    /// Saved registers with their slot offsets, in save order
    saved: Vec<(Reg, i32)>,

    /// Parameter names with their slot offsets, in declaration order
    params: Vec<(String, i32)>,

    /// Local names with their slot offsets, in declaration order
    locals: Vec<(String, i32)>,

    slots: HashMap<String, i32>,

    /// Total size in bytes (multiple of the stack alignment)
    frame_size: i32,
}

impl FrameLayout {
    /// Plan the frame for a method
    pub fn plan(desc: &MethodDescriptor<'_>) -> Result<Self, CodegenError> {
        let method = desc.qualified_name();
        let object_scoped = desc.is_object_scoped();
        let word = CallingConvention::WORD_SIZE;

        let mut offset = 0;
        let mut saved = Vec::new();
        for reg in CallingConvention::saved_registers(object_scoped) {
            offset -= word;
            saved.push((reg, offset));
        }

        let mut slots = HashMap::new();
        let mut assign = |name: &str, offset: i32| -> Result<(String, i32), CodegenError> {
            if slots.insert(name.to_string(), offset).is_some() {
                return Err(CodegenError::DuplicateVariable {
                    method: method.clone(),
                    name: name.to_string(),
                });
            }
            Ok((name.to_string(), offset))
        };

        let mut params = Vec::with_capacity(desc.params().len());
        for param in desc.params() {
            offset -= word;
            params.push(assign(&param.name, offset)?);
        }

        let mut locals = Vec::with_capacity(desc.locals().len());
        for local in desc.locals() {
            offset -= word;
            locals.push(assign(&local.name, offset)?);
        }

        let frame_size = CallingConvention::align_frame(-offset);

        // The frame is released with `addi $sp, $sp, size` and its slots are
        // reached through `$sp` before `$fp` is set, so the whole size must fit
        // the displacement field. Incoming arguments (plus the receiver slot a
        // caller pushes above them) must be reachable from `$fp` as well.
        let incoming = CallingConvention::pushed_receiver_offset(desc.params().len());
        if !CallingConvention::fits_displacement(frame_size)
            || !CallingConvention::fits_displacement(-frame_size)
            || !CallingConvention::fits_displacement(incoming)
        {
            return Err(CodegenError::LayoutOverflow {
                method,
                size: i64::from(frame_size).max(i64::from(incoming)),
                limit: i64::from(CallingConvention::MAX_DISPLACEMENT),
            });
        }

        debug!(
            "Frame for {}: {} bytes ({} saved, {} params, {} locals)",
            method,
            frame_size,
            saved.len(),
            params.len(),
            locals.len()
        );

        Ok(Self {
            object_scoped,
            saved,
            params,
            locals,
            slots,
            frame_size,
        })
    }

    pub fn is_object_scoped(&self) -> bool {
        self.object_scoped
    }

    pub fn frame_size(&self) -> i32 {
        self.frame_size
    }

    /// `$fp`-relative offset of a parameter or local
    pub fn offset_of(&self, name: &str) -> Option<i32> {
        self.slots.get(name).copied()
    }

    pub fn saved_registers(&self) -> &[(Reg, i32)] {
        &self.saved
    }

    pub fn params(&self) -> &[(String, i32)] {
        &self.params
    }

    pub fn locals(&self) -> &[(String, i32)] {
        &self.locals
    }

    /// `$sp`-relative address of a `$fp`-relative slot, valid while `$sp`
    /// sits at the bottom of the frame
    fn sp_relative(&self, fp_offset: i32) -> i32 {
        self.frame_size + fp_offset
    }

    /// Generate the frame-entry block
    ///
    /// 1. Reserve the frame
    /// 2. Save `$ra`, `$s0` (object methods), `$fp`
    /// 3. Point `$fp` at the frame base
    /// 4. Move the incoming receiver into `$s0` (object methods)
    /// 5. Copy caller-pushed arguments into their parameter slots
    /// 6. Zero the locals
    pub fn gen_prologue(&self) -> Vec<Inst> {
        let sp = CallingConvention::STACK_PTR;
        let fp = CallingConvention::FRAME_PTR;
        let mut code = vec![Inst::Addi(sp, sp, -self.frame_size)];

        for &(reg, offset) in &self.saved {
            code.push(Inst::Sw(reg, self.sp_relative(offset), sp));
        }

        code.push(Inst::Addi(fp, sp, self.frame_size));

        if self.object_scoped {
            code.push(Inst::Move(CallingConvention::RECEIVER, CallingConvention::RECEIVER_ARG));
        }

        let scratch = CallingConvention::RESULT;
        let count = self.params.len();
        for (index, (_, offset)) in self.params.iter().enumerate() {
            code.push(Inst::Lw(scratch, CallingConvention::incoming_arg_offset(index, count), fp));
            code.push(Inst::Sw(scratch, *offset, fp));
        }

        for (_, offset) in &self.locals {
            code.push(Inst::Sw(Reg::Zero, *offset, fp));
        }

        code
    }

    /// Generate the frame-exit block
    ///
    /// Reloads the saved registers in the exact reverse of the prologue's
    /// save order, releases the frame and returns through `$ra`. Expects
    /// `$sp` back at the bottom of the frame.
    pub fn gen_epilogue(&self) -> Vec<Inst> {
        let sp = CallingConvention::STACK_PTR;
        let mut code = Vec::with_capacity(self.saved.len() + 2);

        for &(reg, offset) in self.saved.iter().rev() {
            code.push(Inst::Lw(reg, self.sp_relative(offset), sp));
        }

        code.push(Inst::Addi(sp, sp, self.frame_size));
        code.push(Inst::Jr(CallingConvention::LINK));
        code
    }
}
