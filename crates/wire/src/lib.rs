// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-stream wire framing shared by the runner invoker (C2) and the
//! control-stream reader (C3): a length-prefixed JSON framing the reader
//! must accept regardless of which runner backend emits it.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod protocol_wire;

pub use protocol_wire::{
    decode, encode, read_control_message, read_message, write_control_message, write_message,
    ProtocolError, MAX_MESSAGE_SIZE,
};
