/// Districts of West Bengal, in the order the booking form lists them.
pub const DISTRICTS: [&str; 23] = [
    "Alipurduar",
    "Bankura",
    "Birbhum",
    "Cooch Behar",
    "Dakshin Dinajpur",
    "Darjeeling",
    "Hooghly",
    "Howrah",
    "Jalpaiguri",
    "Jhargram",
    "Kalimpong",
    "Kolkata",
    "Malda",
    "Murshidabad",
    "Nadia",
    "North 24 Parganas",
    "Paschim Bardhaman",
    "Paschim Medinipur",
    "Purba Bardhaman",
    "Purba Medinipur",
    "Purulia",
    "South 24 Parganas",
    "Uttar Dinajpur",
];

/// Bucket for bookings saved without a district.
pub const OTHER_DISTRICT: &str = "Other";

pub fn default_districts() -> Vec<String> {
    DISTRICTS.iter().map(|name| name.to_string()).collect()
}

pub fn is_known(districts: &[String], name: &str) -> bool {
    districts.iter().any(|district| district == name)
}
