//! Static tables for the 65xx instruction set and the ca65 dialect.

pub mod mnemonics;
pub mod controls;
