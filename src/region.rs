//! LoRaWAN regulatory regions
//!
//! The modem implements the regional channel plans itself; this module only
//! carries the region identifiers handed to the modem plus the per-region
//! defaults this crate needs to start multicast sessions (downlink frequency
//! and data rate for Class B ping slots and the Class C RX window).

/// Multicast session radio parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MulticastParams {
    /// Downlink frequency in Hz. For Class B, `0` means the frequency hops
    /// with the beacon instead of staying fixed.
    pub frequency: u32,
    /// Downlink data rate index
    pub datarate: u8,
}

/// LoRaWAN regulatory region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Region {
    /// AS923 group 1
    As923Grp1,
    /// AS923 group 2
    As923Grp2,
    /// AS923 group 3
    As923Grp3,
    /// AS923 group 4
    As923Grp4,
    /// AU915
    Au915,
    /// CN470
    Cn470,
    /// EU868
    Eu868,
    /// IN865
    In865,
    /// KR920
    Kr920,
    /// RU864
    Ru864,
    /// US915
    Us915,
    /// Worldwide 2.4 GHz
    Ww2g4,
}

impl Region {
    /// Region name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Region::As923Grp1 => "AS923_GRP1",
            Region::As923Grp2 => "AS923_GRP2",
            Region::As923Grp3 => "AS923_GRP3",
            Region::As923Grp4 => "AS923_GRP4",
            Region::Au915 => "AU915",
            Region::Cn470 => "CN470",
            Region::Eu868 => "EU868",
            Region::In865 => "IN865",
            Region::Kr920 => "KR920",
            Region::Ru864 => "RU864",
            Region::Us915 => "US915",
            Region::Ww2g4 => "WW2G4",
        }
    }

    /// Default Class B multicast parameters for this region.
    ///
    /// Returns `None` where the frequency plan does not specify Class B
    /// operation (the 2.4 GHz plan). A frequency of `0` means the ping
    /// slots hop with the beacon frequency (US915 and AU915).
    pub fn default_multicast_class_b(&self) -> Option<MulticastParams> {
        let (frequency, datarate) = match self {
            Region::Eu868 => (869_525_000, 3),
            Region::As923Grp1 => (923_400_000, 3),
            Region::As923Grp2 => (921_600_000, 3),
            Region::As923Grp3 => (916_800_000, 3),
            Region::As923Grp4 => (917_500_000, 3),
            Region::Us915 => (0, 8),
            Region::Au915 => (0, 8),
            Region::Cn470 => (494_900_000, 2),
            Region::In865 => (866_550_000, 4),
            Region::Kr920 => (923_100_000, 3),
            Region::Ru864 => (868_900_000, 3),
            Region::Ww2g4 => return None,
        };
        Some(MulticastParams {
            frequency,
            datarate,
        })
    }

    /// Default Class C multicast parameters for this region (the RX2-style
    /// continuous receive window).
    pub fn default_multicast_class_c(&self) -> MulticastParams {
        let (frequency, datarate) = match self {
            Region::Eu868 => (869_525_000, 0),
            Region::As923Grp1 => (923_200_000, 2),
            Region::As923Grp2 => (921_400_000, 2),
            Region::As923Grp3 => (916_600_000, 2),
            Region::As923Grp4 => (917_300_000, 2),
            Region::Us915 => (923_300_000, 8),
            Region::Au915 => (923_300_000, 8),
            Region::Cn470 => (492_500_000, 1),
            Region::In865 => (866_550_000, 4),
            Region::Kr920 => (921_900_000, 0),
            Region::Ru864 => (869_100_000, 0),
            Region::Ww2g4 => (2_423_000_000, 0),
        };
        MulticastParams {
            frequency,
            datarate,
        }
    }
}
