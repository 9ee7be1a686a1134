use std::fmt;

use serde::{Deserialize, Serialize};

const MENS_PREFIX: &str = "Men's ";
const WOMENS_PREFIX: &str = "Women's ";

/// Competition categories offered at the tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Men's Singles")]
    MensSingles,
    #[serde(rename = "Women's Singles")]
    WomensSingles,
    #[serde(rename = "Men's Doubles")]
    MensDoubles,
    #[serde(rename = "Women's Doubles")]
    WomensDoubles,
    #[serde(rename = "Mixed Doubles")]
    MixedDoubles,
}

/// Gendered grouping used to keep men's and women's draws mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFamily {
    Men,
    Women,
}

impl CategoryFamily {
    pub fn opposite(self) -> Self {
        match self {
            CategoryFamily::Men => CategoryFamily::Women,
            CategoryFamily::Women => CategoryFamily::Men,
        }
    }
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::MensSingles,
        Category::WomensSingles,
        Category::MensDoubles,
        Category::WomensDoubles,
        Category::MixedDoubles,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Category::MensSingles => "Men's Singles",
            Category::WomensSingles => "Women's Singles",
            Category::MensDoubles => "Men's Doubles",
            Category::WomensDoubles => "Women's Doubles",
            Category::MixedDoubles => "Mixed Doubles",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.label() == label.trim())
    }

    pub fn family(self) -> Option<CategoryFamily> {
        let label = self.label();
        if label.starts_with(MENS_PREFIX) {
            Some(CategoryFamily::Men)
        } else if label.starts_with(WOMENS_PREFIX) {
            Some(CategoryFamily::Women)
        } else {
            None
        }
    }

    /// Two-person team categories need a partner on the registration.
    pub fn is_doubles(self) -> bool {
        self.label().contains("Doubles")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Self-reported or suggested playing level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub const fn label(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
        }
    }
}

/// A market and the office cities registrants can play from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Market {
    pub name: &'static str,
    pub cities: &'static [&'static str],
}

pub const MARKETS: &[Market] = &[
    Market {
        name: "Singapore",
        cities: &["Singapore (Galaxis)", "Singapore (Solaris)"],
    },
    Market {
        name: "China",
        cities: &["Shenzhen", "Shanghai", "Beijing"],
    },
    Market {
        name: "Indonesia",
        cities: &["Jakarta"],
    },
    Market {
        name: "Vietnam",
        cities: &["Ho Chi Minh City", "Hanoi"],
    },
    Market {
        name: "Thailand",
        cities: &["Bangkok"],
    },
];

pub fn market(name: &str) -> Option<&'static Market> {
    MARKETS.iter().find(|market| market.name == name)
}

pub fn cities_for(market_name: &str) -> &'static [&'static str] {
    market(market_name).map(|market| market.cities).unwrap_or(&[])
}

pub fn default_city(market_name: &str) -> Option<&'static str> {
    cities_for(market_name).first().copied()
}

pub fn is_known_location(market_name: &str, city: &str) -> bool {
    cities_for(market_name).contains(&city)
}
