/*
    MartyPC
    https://github.com/dbalsom/martypc

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    ---------------------------------------------------------------------------

    flags.rs

    Status flag identities and the closed set of per-instruction flag effects.

*/

use strum_macros::Display;

/// One of the four SM83 status flags, in canonical (register F, high to low) order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum Flag {
    Z,
    N,
    H,
    C,
}

impl Flag {
    pub const ALL: [Flag; 4] = [Flag::Z, Flag::N, Flag::H, Flag::C];

    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The name of the CPU field (and routine parameter) holding this flag.
    pub fn binding(&self) -> &'static str {
        match self {
            Flag::Z => "zf",
            Flag::N => "nf",
            Flag::H => "hf",
            Flag::C => "cf",
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Flag::Z => 'Z',
            Flag::N => 'N',
            Flag::H => 'H',
            Flag::C => 'C',
        }
    }
}

/// The bit position tested for a carry out of an addition or a borrow into a subtraction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CarryWidth {
    Bit4,
    Bit8,
    Bit12,
    Bit16,
}

impl CarryWidth {
    pub fn bit(&self) -> u8 {
        match self {
            CarryWidth::Bit4 => 4,
            CarryWidth::Bit8 => 8,
            CarryWidth::Bit12 => 12,
            CarryWidth::Bit16 => 16,
        }
    }

    pub fn from_bit(bit: u8) -> Option<CarryWidth> {
        match bit {
            4 => Some(CarryWidth::Bit4),
            8 => Some(CarryWidth::Bit8),
            12 => Some(CarryWidth::Bit12),
            16 => Some(CarryWidth::Bit16),
            _ => None,
        }
    }

    /// The integer type operands are widened to before the carry test. Bit 8 of a u8 sum
    /// (or bit 16 of a u16 sum) only survives in the next wider type.
    pub fn widened_type(&self) -> &'static str {
        match self {
            CarryWidth::Bit4 | CarryWidth::Bit8 => "u16",
            CarryWidth::Bit12 | CarryWidth::Bit16 => "u32",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FlagEffect {
    FixedFalse,
    FixedTrue,
    Unaffected,
    Computed(Option<CarryWidth>),
}

impl FlagEffect {
    /// Parse the table's notation for a flag: `0`, `1`, `-`, or the flag's own letter.
    pub fn parse(flag: Flag, state: &str) -> Option<FlagEffect> {
        match state.trim() {
            "0" => Some(FlagEffect::FixedFalse),
            "1" => Some(FlagEffect::FixedTrue),
            "-" => Some(FlagEffect::Unaffected),
            s if s.len() == 1 && s.starts_with(flag.letter()) => Some(FlagEffect::Computed(None)),
            _ => None,
        }
    }

    pub fn fixed_value(&self) -> Option<bool> {
        match self {
            FlagEffect::FixedFalse => Some(false),
            FlagEffect::FixedTrue => Some(true),
            _ => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, FlagEffect::Computed(_))
    }
}

/// The effect of one instruction on all four flags.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FlagEffectMap {
    effects: [FlagEffect; 4],
}

impl Default for FlagEffectMap {
    fn default() -> Self {
        Self {
            effects: [FlagEffect::Unaffected; 4],
        }
    }
}

impl FlagEffectMap {
    pub fn new(z: FlagEffect, n: FlagEffect, h: FlagEffect, c: FlagEffect) -> Self {
        Self { effects: [z, n, h, c] }
    }

    pub fn get(&self, flag: Flag) -> FlagEffect {
        self.effects[flag.index()]
    }

    pub fn set(&mut self, flag: Flag, effect: FlagEffect) {
        self.effects[flag.index()] = effect;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Flag, FlagEffect)> + '_ {
        Flag::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    pub fn computed(&self) -> impl Iterator<Item = Flag> + '_ {
        self.iter().filter(|(_, e)| e.is_computed()).map(|(f, _)| f)
    }

    pub fn fixed(&self) -> impl Iterator<Item = (Flag, bool)> + '_ {
        self.iter().filter_map(|(f, e)| e.fixed_value().map(|v| (f, v)))
    }
}

impl std::fmt::Display for FlagEffectMap {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (flag, effect) in self.iter() {
            let c = match effect {
                FlagEffect::FixedFalse => '0',
                FlagEffect::FixedTrue => '1',
                FlagEffect::Unaffected => '-',
                FlagEffect::Computed(_) => flag.letter(),
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flag_states() {
        assert_eq!(FlagEffect::parse(Flag::Z, "0"), Some(FlagEffect::FixedFalse));
        assert_eq!(FlagEffect::parse(Flag::N, "1"), Some(FlagEffect::FixedTrue));
        assert_eq!(FlagEffect::parse(Flag::H, "-"), Some(FlagEffect::Unaffected));
        assert_eq!(FlagEffect::parse(Flag::C, "C"), Some(FlagEffect::Computed(None)));
        // A flag's state may only name the flag itself.
        assert_eq!(FlagEffect::parse(Flag::C, "H"), None);
        assert_eq!(FlagEffect::parse(Flag::Z, "x"), None);
    }

    #[test]
    fn effect_map_display() {
        let map = FlagEffectMap::new(
            FlagEffect::Computed(None),
            FlagEffect::FixedFalse,
            FlagEffect::Computed(Some(CarryWidth::Bit4)),
            FlagEffect::Unaffected,
        );
        assert_eq!(map.to_string(), "Z0H-");
        assert_eq!(map.computed().collect::<Vec<_>>(), vec![Flag::Z, Flag::H]);
        assert_eq!(map.fixed().collect::<Vec<_>>(), vec![(Flag::N, false)]);
    }

    #[test]
    fn flag_order() {
        for (i, flag) in Flag::ALL.iter().enumerate() {
            assert_eq!(flag.index(), i);
            assert_eq!(flag.to_string(), flag.letter().to_string());
        }
        assert_eq!(Flag::ALL.map(|f| f.binding()), ["zf", "nf", "hf", "cf"]);
    }

    #[test]
    fn carry_width_types() {
        assert_eq!(CarryWidth::from_bit(12), Some(CarryWidth::Bit12));
        assert_eq!(CarryWidth::from_bit(7), None);
        assert_eq!(CarryWidth::Bit8.widened_type(), "u16");
        assert_eq!(CarryWidth::Bit16.widened_type(), "u32");
    }
}
