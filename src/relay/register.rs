//! Relay bank state and the P5 register codec.
//!
//! The P5 register is an INTEGER whose low 8 bits hold the relays, bit 0
//! being pin 1.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidArgument, Result};

/// Number of relays on the P5 port.
pub const PIN_COUNT: usize = 8;

/// A relay pin number, 1..=8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pin(u8);

impl Pin {
    /// Validate a caller supplied pin number.
    pub fn new(pin: i64) -> Result<Self> {
        if (1..=PIN_COUNT as i64).contains(&pin) {
            Ok(Self(pin as u8))
        } else {
            Err(InvalidArgument::Pin(pin).into())
        }
    }

    /// 1-based pin number.
    pub fn number(self) -> u8 {
        self.0
    }

    /// 0-based position in [`RelayBankState`] and bit in the register.
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// All pins, in order.
    pub fn all() -> impl Iterator<Item = Pin> {
        (1..=PIN_COUNT as u8).map(Pin)
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Pin {
    type Error = Error;

    fn try_from(pin: i64) -> Result<Self> {
        Self::new(pin)
    }
}

/// Validate a pin value (0 = off, 1 = on).
pub fn pin_value(value: i64) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(InvalidArgument::PinValue(other).into()),
    }
}

/// State of the eight relays, pin 1 first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RelayBankState([bool; PIN_COUNT]);

impl RelayBankState {
    /// All relays off.
    pub const ALL_OFF: Self = Self([false; PIN_COUNT]);
    /// All relays on.
    pub const ALL_ON: Self = Self([true; PIN_COUNT]);

    pub fn new(relays: [bool; PIN_COUNT]) -> Self {
        Self(relays)
    }

    /// Build from 0/1 values, rejecting wrong lengths and other values.
    pub fn from_bits(bits: &[u8]) -> Result<Self> {
        if bits.len() != PIN_COUNT {
            return Err(InvalidArgument::State(format!(
                "expected {} values, got {}",
                PIN_COUNT,
                bits.len()
            ))
            .into());
        }

        let mut relays = [false; PIN_COUNT];
        for (slot, &bit) in relays.iter_mut().zip(bits) {
            *slot = match bit {
                0 => false,
                1 => true,
                other => {
                    return Err(
                        InvalidArgument::State(format!("value {} is not 0 or 1", other)).into(),
                    );
                }
            };
        }
        Ok(Self(relays))
    }

    /// Relay values as 0/1, pin 1 first.
    pub fn as_bits(&self) -> [u8; PIN_COUNT] {
        self.0.map(u8::from)
    }

    pub fn as_array(&self) -> &[bool; PIN_COUNT] {
        &self.0
    }

    /// State of one relay.
    pub fn get(&self, pin: Pin) -> bool {
        self.0[pin.index()]
    }

    pub fn set(&mut self, pin: Pin, on: bool) {
        self.0[pin.index()] = on;
    }

    /// Copy with one relay changed.
    pub fn with(mut self, pin: Pin, on: bool) -> Self {
        self.set(pin, on);
        self
    }
}

impl From<[bool; PIN_COUNT]> for RelayBankState {
    fn from(relays: [bool; PIN_COUNT]) -> Self {
        Self(relays)
    }
}

/// `[1,0,1,0,1,0,1,0]`
impl fmt::Display for RelayBankState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, bit) in self.as_bits().iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", bit)?;
        }
        f.write_str("]")
    }
}

/// Parse either a bit list (`1,0,1,0,1,0,1,0`, brackets optional) or a
/// register mask (`170`, `0xAA`).
impl FromStr for RelayBankState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let inner = s
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(s);

        if inner.contains(',') {
            let bits = inner
                .split(',')
                .map(|part| part.trim().parse::<u8>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| InvalidArgument::State(format!("invalid bit list '{}'", s)))?;
            return Self::from_bits(&bits);
        }

        let mask = match inner.strip_prefix("0x").or_else(|| inner.strip_prefix("0X")) {
            Some(hex) => u8::from_str_radix(hex, 16),
            None => inner.parse::<u8>(),
        }
        .map_err(|_| InvalidArgument::State(format!("invalid register mask '{}'", s)))?;

        Ok(decode(mask as i32))
    }
}

/// Decode a register value. Only the low 8 bits are used; never fails.
pub fn decode(register: i32) -> RelayBankState {
    let mut relays = [false; PIN_COUNT];
    for (i, slot) in relays.iter_mut().enumerate() {
        *slot = (register >> i) & 1 == 1;
    }
    RelayBankState(relays)
}

/// Encode a state into its register value (0..=255).
pub fn encode(state: &RelayBankState) -> i32 {
    state
        .0
        .iter()
        .enumerate()
        .fold(0, |acc, (i, &on)| acc | (i32::from(on) << i))
}
