use std::fmt;

/// A category of console fader with its own id range and address template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterClass {
    Channel,
    AuxIn,
    Bus,
}

impl ParameterClass {
    pub const ALL: [ParameterClass; 3] = [
        ParameterClass::Channel,
        ParameterClass::AuxIn,
        ParameterClass::Bus,
    ];

    /// Number of faders in this class. Ids run from 1 to `count()`.
    pub const fn count(self) -> usize {
        match self {
            ParameterClass::Channel => 32,
            ParameterClass::AuxIn => 6,
            ParameterClass::Bus => 16,
        }
    }

    /// First path segment used by the console for this class.
    pub const fn tag(self) -> &'static str {
        match self {
            ParameterClass::Channel => "ch",
            ParameterClass::AuxIn => "auxin",
            ParameterClass::Bus => "bus",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ch" => Some(ParameterClass::Channel),
            "auxin" => Some(ParameterClass::AuxIn),
            "bus" => Some(ParameterClass::Bus),
            _ => None,
        }
    }

    /// Address a fade command for this class arrives on.
    pub const fn command_address(self) -> &'static str {
        match self {
            ParameterClass::Channel => "/fade/channel",
            ParameterClass::AuxIn => "/fade/aux",
            ParameterClass::Bus => "/fade/bus",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParameterClass::Channel => "channel",
            ParameterClass::AuxIn => "aux",
            ParameterClass::Bus => "bus",
        }
    }
}

/// A single fader on the console: a class plus a 1-based index.
///
/// The index is range-checked on construction, so every `ParamId` maps to a
/// valid store slot and a valid console address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId {
    class: ParameterClass,
    index: u8,
}

impl ParamId {
    pub fn new(class: ParameterClass, index: i64) -> Option<Self> {
        if index >= 1 && index as usize <= class.count() {
            Some(Self {
                class,
                index: index as u8,
            })
        } else {
            None
        }
    }

    pub fn class(self) -> ParameterClass {
        self.class
    }

    /// 1-based index as the console numbers it.
    pub fn index(self) -> u8 {
        self.index
    }

    /// Zero-based slot in the per-class store.
    pub fn slot(self) -> usize {
        self.index as usize - 1
    }

    /// Console address of this fader, e.g. `/ch/5/mix/fader`.
    pub fn address(self) -> String {
        format!("/{}/{}/mix/fader", self.class.tag(), self.index)
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}/mix/fader", self.class.tag(), self.index)
    }
}
