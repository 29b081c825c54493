/// VM module - simulator for compiled MiniJava units

mod execution;
mod memory;

use crate::constants::*;
use crate::error::VmError;
use log::{debug, info};
use mjc_codegen::{CompiledUnit, DataValue, Inst, Reg};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VMState {
    Setup,
    Running,
    Halted,
    Error(String),
}

/// Simulator configuration
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Memory size in bytes
    pub memory_size: usize,
    /// Instructions executed before the run is aborted
    pub step_limit: u64,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

/// Observable result of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Everything printed through syscalls
    pub output: String,
    pub exit_code: i32,
    /// `$sp` when execution started and when it halted
    pub initial_sp: i32,
    pub final_sp: i32,
    pub steps: u64,
}

pub struct VM {
    // Flattened instructions of every procedure, in unit order
    instructions: Vec<Inst>,

    // Code label -> instruction index
    labels: HashMap<String, usize>,

    // Data label -> byte address
    data_labels: HashMap<String, u32>,

    pub registers: [i32; NUM_REGISTERS],
    memory: Vec<u8>,
    pc: usize,

    // First free heap byte
    brk: u32,

    pub state: VMState,
    config: VmConfig,

    pub output: String,
    exit_code: i32,
    initial_sp: i32,
    pub steps: u64,
}

impl VM {
    pub fn new(config: VmConfig) -> Self {
        let memory_size = config.memory_size.max(MIN_MEMORY_SIZE) / STACK_ALIGN * STACK_ALIGN;
        VM {
            instructions: Vec::new(),
            labels: HashMap::new(),
            data_labels: HashMap::new(),
            registers: [0; NUM_REGISTERS],
            memory: vec![0; memory_size],
            pc: 0,
            brk: DATA_BASE as u32,
            state: VMState::Setup,
            config,
            output: String::new(),
            exit_code: 0,
            initial_sp: 0,
            steps: 0,
        }
    }

    /// Load a unit: lay out its data section, resolve labels and point the
    /// program counter at `main`
    pub fn load(&mut self, unit: &CompiledUnit) -> Result<(), VmError> {
        self.instructions = unit.instructions().cloned().collect();
        self.labels.clear();
        for (index, inst) in self.instructions.iter().enumerate() {
            if let Inst::Label(label) = inst {
                self.labels.insert(label.clone(), index);
            }
        }

        self.data_labels.clear();
        let mut addr = DATA_BASE;
        for entry in &unit.data {
            let bytes = match &entry.value {
                DataValue::Asciiz(text) => {
                    let mut bytes = text.as_bytes().to_vec();
                    bytes.push(0);
                    bytes
                }
            };
            let end = addr + bytes.len();
            if end + STACK_ALIGN > self.memory.len() {
                return Err(VmError::DataTooLarge { size: end - DATA_BASE, memory: self.memory.len() });
            }
            self.memory[addr..end].copy_from_slice(&bytes);
            self.data_labels.insert(entry.label.clone(), addr as u32);
            addr = end.next_multiple_of(WORD_BYTES);
        }
        self.brk = addr.next_multiple_of(STACK_ALIGN) as u32;

        self.pc = *self
            .labels
            .get("main")
            .ok_or_else(|| VmError::NoEntry("main".to_string()))?;

        let top = self.memory.len() as i32;
        self.registers = [0; NUM_REGISTERS];
        self.registers[Reg::Sp.number()] = top;
        self.registers[Reg::Fp.number()] = top;
        self.initial_sp = top;
        self.state = VMState::Running;

        debug!(
            "Loaded {} instructions, {} data bytes, heap at {:#x}, stack at {:#x}",
            self.instructions.len(),
            self.brk as usize - DATA_BASE,
            self.brk,
            top
        );
        Ok(())
    }

    /// Run until the program exits, faults or exceeds the step limit
    pub fn run(&mut self) -> Result<RunOutcome, VmError> {
        while self.state == VMState::Running {
            if self.steps >= self.config.step_limit {
                return self.fail(VmError::StepLimit(self.config.step_limit));
            }
            if let Err(err) = self.step() {
                return self.fail(err);
            }
        }

        info!("Halted after {} steps with exit code {}", self.steps, self.exit_code);
        Ok(RunOutcome {
            output: self.output.clone(),
            exit_code: self.exit_code,
            initial_sp: self.initial_sp,
            final_sp: self.reg(Reg::Sp),
            steps: self.steps,
        })
    }

    fn fail(&mut self, err: VmError) -> Result<RunOutcome, VmError> {
        self.state = VMState::Error(err.to_string());
        Err(err)
    }

    /// Execute one instruction
    pub fn step(&mut self) -> Result<(), VmError> {
        let inst = self
            .instructions
            .get(self.pc)
            .cloned()
            .ok_or(VmError::InvalidCodeAddress(self.pc as i32))?;
        self.pc += 1;
        self.steps += 1;
        self.execute_instruction(&inst)
    }

    pub fn reg(&self, reg: Reg) -> i32 {
        self.registers[reg.number()]
    }

    fn set_reg(&mut self, reg: Reg, value: i32) {
        // $zero is hard-wired
        if reg != Reg::Zero {
            self.registers[reg.number()] = value;
        }
    }
}

/// Load and run a unit with the given configuration
pub fn run_unit(unit: &CompiledUnit, config: VmConfig) -> Result<RunOutcome, VmError> {
    let mut vm = VM::new(config);
    vm.load(unit)?;
    vm.run()
}
