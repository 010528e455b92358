/// An annual meteor shower with its usual peak and zenithal hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeteorShower {
    pub name: &'static str,
    pub peak: &'static str,
    pub rate_per_hour: u32,
    pub month: u32,
}

pub const METEOR_SHOWERS: [MeteorShower; 8] = [
    MeteorShower { name: "Quadrantids", peak: "Jan 3-4", rate_per_hour: 120, month: 1 },
    MeteorShower { name: "Lyrids", peak: "Apr 22-23", rate_per_hour: 18, month: 4 },
    MeteorShower { name: "Eta Aquariids", peak: "May 6-7", rate_per_hour: 60, month: 5 },
    MeteorShower { name: "Delta Aquariids", peak: "Jul 29-30", rate_per_hour: 20, month: 7 },
    MeteorShower { name: "Perseids", peak: "Aug 12-13", rate_per_hour: 100, month: 8 },
    MeteorShower { name: "Orionids", peak: "Oct 21-22", rate_per_hour: 20, month: 10 },
    MeteorShower { name: "Leonids", peak: "Nov 17-18", rate_per_hour: 15, month: 11 },
    MeteorShower { name: "Geminids", peak: "Dec 13-14", rate_per_hour: 120, month: 12 },
];

pub fn active_showers(month: u32) -> Vec<MeteorShower> {
    METEOR_SHOWERS
        .iter()
        .filter(|s| s.month == month)
        .copied()
        .collect()
}
