//! Location Directory
//!
//! Static, read-only mapping from US state to a short ordered list of its
//! cities. Built once at startup and shared behind an `Arc`.

use serde::Serialize;

/// Literal source table, in alphabetical state order.
const US_STATES_CITIES: &[(&str, &[&str])] = &[
    ("Alabama", &["Birmingham", "Montgomery", "Mobile", "Huntsville"]),
    ("Alaska", &["Anchorage", "Fairbanks", "Juneau", "Sitka"]),
    ("Arizona", &["Phoenix", "Tucson", "Mesa", "Scottsdale"]),
    ("Arkansas", &["Little Rock", "Fayetteville", "Hot Springs", "Fort Smith"]),
    ("California", &["Los Angeles", "San Francisco", "San Diego", "Sacramento"]),
    ("Colorado", &["Denver", "Colorado Springs", "Aurora", "Boulder"]),
    ("Connecticut", &["Hartford", "New Haven", "Stamford", "Bridgeport"]),
    ("Delaware", &["Wilmington", "Dover", "Newark", "Middletown"]),
    ("Florida", &["Miami", "Orlando", "Tampa", "Jacksonville"]),
    ("Georgia", &["Atlanta", "Augusta", "Savannah", "Columbus"]),
    ("Hawaii", &["Honolulu", "Hilo", "Maui", "Kailua"]),
    ("Idaho", &["Boise", "Meridian", "Nampa", "Idaho Falls"]),
    ("Illinois", &["Chicago", "Springfield", "Peoria", "Naperville"]),
    ("Indiana", &["Indianapolis", "Fort Wayne", "Evansville", "South Bend"]),
    ("Iowa", &["Des Moines", "Cedar Rapids", "Davenport", "Sioux City"]),
    ("Kansas", &["Topeka", "Wichita", "Overland Park", "Lawrence"]),
    ("Kentucky", &["Louisville", "Lexington", "Bowling Green", "Covington"]),
    ("Louisiana", &["New Orleans", "Baton Rouge", "Shreveport", "Lafayette"]),
    ("Maine", &["Portland", "Augusta", "Bangor", "Lewiston"]),
    ("Maryland", &["Baltimore", "Annapolis", "Silver Spring", "Frederick"]),
    ("Massachusetts", &["Boston", "Worcester", "Cambridge", "Springfield"]),
    ("Michigan", &["Detroit", "Grand Rapids", "Ann Arbor", "Lansing"]),
    ("Minnesota", &["Minneapolis", "Saint Paul", "Rochester", "Duluth"]),
    ("Mississippi", &["Jackson", "Gulfport", "Biloxi", "Hattiesburg"]),
    ("Missouri", &["St. Louis", "Kansas City", "Columbia", "Springfield"]),
    ("Montana", &["Billings", "Missoula", "Helena", "Bozeman"]),
    ("Nebraska", &["Omaha", "Lincoln", "Bellevue", "Grand Island"]),
    ("Nevada", &["Las Vegas", "Reno", "Henderson", "Carson City"]),
    ("New Hampshire", &["Manchester", "Concord", "Nashua", "Dover"]),
    ("New Jersey", &["Newark", "Jersey City", "Paterson", "Trenton"]),
    ("New Mexico", &["Albuquerque", "Santa Fe", "Las Cruces", "Roswell"]),
    ("New York", &["New York City", "Buffalo", "Rochester", "Syracuse"]),
    ("North Carolina", &["Charlotte", "Raleigh", "Greensboro", "Durham"]),
    ("North Dakota", &["Fargo", "Bismarck", "Grand Forks", "Minot"]),
    ("Ohio", &["Columbus", "Cleveland", "Cincinnati", "Toledo"]),
    ("Oklahoma", &["Oklahoma City", "Tulsa", "Norman", "Broken Arrow"]),
    ("Oregon", &["Portland", "Salem", "Eugene", "Beaverton"]),
    ("Pennsylvania", &["Philadelphia", "Pittsburgh", "Harrisburg", "Allentown"]),
    ("Rhode Island", &["Providence", "Warwick", "Cranston", "Pawtucket"]),
    ("South Carolina", &["Columbia", "Charleston", "Greenville", "Myrtle Beach"]),
    ("South Dakota", &["Sioux Falls", "Pierre", "Rapid City", "Aberdeen"]),
    ("Tennessee", &["Nashville", "Memphis", "Knoxville", "Chattanooga"]),
    ("Texas", &["Houston", "Dallas", "Austin", "San Antonio"]),
    ("Utah", &["Salt Lake City", "Provo", "West Valley City", "Ogden"]),
    ("Vermont", &["Montpelier", "Burlington", "Rutland", "Stowe"]),
    ("Virginia", &["Virginia Beach", "Richmond", "Norfolk", "Chesapeake"]),
    ("Washington", &["Seattle", "Spokane", "Tacoma", "Bellevue"]),
    ("West Virginia", &["Charleston", "Morgantown", "Huntington", "Parkersburg"]),
    ("Wisconsin", &["Milwaukee", "Madison", "Green Bay", "Kenosha"]),
    ("Wyoming", &["Cheyenne", "Casper", "Laramie", "Gillette"]),
];

/// A region (US state) and its places, in listing order
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    pub places: Vec<String>,
}

impl Region {
    /// First listed place, used when a concrete city is needed
    pub fn first_place(&self) -> Option<&str> {
        self.places.first().map(String::as_str)
    }

    /// Case-insensitive place membership within this region
    pub fn has_place(&self, place: &str) -> bool {
        self.places.iter().any(|p| p.eq_ignore_ascii_case(place))
    }
}

/// One `(region, place)` pair of the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceEntry<'a> {
    pub region: &'a str,
    pub place: &'a str,
}

/// Ordered region → places mapping
#[derive(Debug, Clone)]
pub struct LocationDirectory {
    regions: Vec<Region>,
}

impl LocationDirectory {
    /// Build the directory of US states and their major cities
    pub fn us_states() -> Self {
        Self::from_table(US_STATES_CITIES)
    }

    /// Build a directory from a literal table
    pub fn from_table(table: &[(&str, &[&str])]) -> Self {
        let regions = table
            .iter()
            .map(|(name, places)| Region {
                name: (*name).to_string(),
                places: places.iter().map(|p| (*p).to_string()).collect(),
            })
            .collect();
        Self { regions }
    }

    /// Regions in insertion order
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Number of regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Case-insensitive region lookup
    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    pub fn is_region(&self, name: &str) -> bool {
        self.region(name).is_some()
    }

    /// True if any region lists `name` as a place
    pub fn is_place(&self, name: &str) -> bool {
        self.regions.iter().any(|r| r.has_place(name))
    }

    /// First listed place of `region`, if it is a known region
    pub fn first_place(&self, region: &str) -> Option<&str> {
        self.region(region).and_then(Region::first_place)
    }

    /// Every `(region, place)` pair in directory order
    pub fn entries(&self) -> impl Iterator<Item = PlaceEntry<'_>> {
        self.regions.iter().flat_map(|r| {
            r.places.iter().map(move |p| PlaceEntry {
                region: &r.name,
                place: p,
            })
        })
    }

    /// All names (regions and places), used to seed the spelling dictionary
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().flat_map(|r| {
            std::iter::once(r.name.as_str()).chain(r.places.iter().map(String::as_str))
        })
    }
}

impl Default for LocationDirectory {
    fn default() -> Self {
        Self::us_states()
    }
}
