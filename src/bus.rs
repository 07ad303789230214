//! Scalar message bus between the input, pump and main threads.

use num_traits::ToPrimitive;

#[derive(Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub enum AppOp {
    Redraw = 0,
    Rawkeys,
    Pump,
    Quit,
}

/// Opcode plus two argument words.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Message {
    pub id: usize,
    pub arg1: u64,
    pub arg2: u64,
}

impl Message {
    pub fn scalar<T: ToPrimitive>(op: T, arg1: u64, arg2: u64) -> Self {
        Self {
            // Unrepresentable ops decode as unknown on the receiving side
            id: op.to_usize().unwrap_or(usize::MAX),
            arg1,
            arg2,
        }
    }
}
