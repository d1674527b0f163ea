pub use common::demo_analysis::RoundWinReason as RoundEndReason;

// https://github.com/markus-wa/demoinfocs-golang/blob/205b0bb25e9f3e96e1d306d154199b4a6292940e/pkg/demoinfocs/events/events.go#L53
pub static ROUND_END_REASON: phf::Map<i32, RoundEndReason> = phf::phf_map! {
    0_i32 => RoundEndReason::StillInProgress,
    1_i32 => RoundEndReason::BombExploded,
    2_i32 => RoundEndReason::VipEscaped,
    3_i32 => RoundEndReason::VipKilled,
    4_i32 => RoundEndReason::TSaved,
    5_i32 => RoundEndReason::CtStoppedEscape,
    6_i32 => RoundEndReason::RoundEndReasonTerroristsStopped,
    7_i32 => RoundEndReason::BombDefused,
    8_i32 => RoundEndReason::TKilled,
    9_i32 => RoundEndReason::CTKilled,
    10_i32 => RoundEndReason::Draw,
    11_i32 => RoundEndReason::HostageRescued,
    12_i32 => RoundEndReason::TimeRanOut,
    13_i32 => RoundEndReason::RoundEndReasonHostagesNotRescued,
    14_i32 => RoundEndReason::TerroristsNotEscaped,
    15_i32 => RoundEndReason::VipNotEscaped,
    16_i32 => RoundEndReason::GameStart,
    17_i32 => RoundEndReason::TSurrender,
    18_i32 => RoundEndReason::CTSurrender,
    19_i32 => RoundEndReason::TPlanted,
    20_i32 => RoundEndReason::CTReachedHostage,
};

pub fn round_end_reason(code: i32) -> Option<RoundEndReason> {
    ROUND_END_REASON.get(&code).copied()
}

/// Rounds ending like this were not actually played out
pub fn is_degenerate(reason: RoundEndReason) -> bool {
    matches!(
        reason,
        RoundEndReason::Draw | RoundEndReason::TSurrender | RoundEndReason::CTSurrender
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EquipmentClass {
    Unknown,
    Pistol,
    Smg,
    Heavy,
    Rifle,
    Equipment,
    Grenade,
}

/// Finer grained grouping used for the per-weapon kill statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WeaponCategory {
    Melee,
    Pistol,
    Shotgun,
    Smg,
    AssaultRifle,
    SniperRifle,
    MachineGun,
    Grenade,
    Other,
}

impl WeaponCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Melee => "melee",
            Self::Pistol => "pistol",
            Self::Shotgun => "shotgun",
            Self::Smg => "smg",
            Self::AssaultRifle => "assault_rifle",
            Self::SniperRifle => "sniper_rifle",
            Self::MachineGun => "machine_gun",
            Self::Grenade => "grenade",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weapon {
    pub name: String,
    pub class: EquipmentClass,
}

static EQUIPMENT_PRICE: phf::Map<&'static str, i32> = phf::phf_map! {
    "AK-47" => 2700,
    "AUG" => 3300,
    "AWP" => 4750,
    "PP-Bizon" => 1400,
    "Desert Eagle" => 700,
    "Dual Berettas" => 400,
    "FAMAS" => 2250,
    "Five-SeveN" => 500,
    "G3SG1" => 5000,
    "Galil AR" => 2000,
    "Glock-18" => 200,
    "P2000" => 200,
    "M249" => 5200,
    "M4A4" => 3100,
    "M4A1" => 2900,
    "MAC-10" => 1050,
    "MAG-7" => 1300,
    "MP5-SD" => 1500,
    "MP7" => 1500,
    "MP9" => 1250,
    "Negev" => 1700,
    "Nova" => 1050,
    "P250" => 300,
    "P90" => 2350,
    "Sawed-Off" => 1100,
    "SCAR-20" => 5000,
    "SG 553" => 3000,
    "SSG 08" => 1700,
    "Tec-9" => 500,
    "UMP-45" => 1200,
    "XM1014" => 2000,
    "CZ75 Auto" => 500,
    "USP-S" => 200,
    "R8 Revolver" => 600,
};

static SNIPER_RIFLES: phf::Set<&'static str> = phf::phf_set! {
    "AWP",
    "SSG 08",
    "SCAR-20",
    "G3SG1",
};

static SHOTGUNS: phf::Set<&'static str> = phf::phf_set! {
    "Nova",
    "XM1014",
    "MAG-7",
    "Sawed-Off",
};

static MACHINE_GUNS: phf::Set<&'static str> = phf::phf_set! {
    "M249",
    "Negev",
};

impl Weapon {
    pub fn new(name: impl Into<String>, class: EquipmentClass) -> Self {
        Self {
            name: name.into(),
            class,
        }
    }

    pub fn price(&self) -> Option<i32> {
        EQUIPMENT_PRICE.get(self.name.as_str()).copied()
    }

    pub fn is_known(&self) -> bool {
        self.class != EquipmentClass::Unknown
    }

    pub fn is_he_grenade(&self) -> bool {
        self.name == "HE Grenade"
    }

    pub fn is_fire(&self) -> bool {
        self.name == "Molotov" || self.name == "Incendiary Grenade"
    }

    pub fn category(&self) -> WeaponCategory {
        let name = self.name.as_str();
        match self.class {
            EquipmentClass::Pistol => WeaponCategory::Pistol,
            EquipmentClass::Smg => WeaponCategory::Smg,
            EquipmentClass::Grenade => WeaponCategory::Grenade,
            EquipmentClass::Heavy if SHOTGUNS.contains(name) => WeaponCategory::Shotgun,
            EquipmentClass::Heavy if MACHINE_GUNS.contains(name) => WeaponCategory::MachineGun,
            EquipmentClass::Rifle if SNIPER_RIFLES.contains(name) => WeaponCategory::SniperRifle,
            EquipmentClass::Rifle => WeaponCategory::AssaultRifle,
            EquipmentClass::Equipment if name.contains("Knife") => WeaponCategory::Melee,
            _ => WeaponCategory::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HitGroup {
    Generic,
    Head,
    Chest,
    Stomach,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
    Neck,
    Gear,
}

impl HitGroup {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Head => "head",
            Self::Chest => "chest",
            Self::Stomach => "stomach",
            Self::LeftArm => "left_arm",
            Self::RightArm => "right_arm",
            Self::LeftLeg => "left_leg",
            Self::RightLeg => "right_leg",
            Self::Neck => "neck",
            Self::Gear => "gear",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes() {
        assert_eq!(Some(RoundEndReason::BombDefused), round_end_reason(7));
        assert_eq!(None, round_end_reason(42));
        assert!(is_degenerate(RoundEndReason::Draw));
        assert!(!is_degenerate(RoundEndReason::TKilled));
    }

    #[test]
    fn categories() {
        assert_eq!(
            WeaponCategory::SniperRifle,
            Weapon::new("AWP", EquipmentClass::Rifle).category()
        );
        assert_eq!(
            WeaponCategory::Shotgun,
            Weapon::new("Nova", EquipmentClass::Heavy).category()
        );
        assert_eq!(Some(2700), Weapon::new("AK-47", EquipmentClass::Rifle).price());
        assert_eq!(None, Weapon::new("Knife", EquipmentClass::Equipment).price());
    }
}
