use jiff::SignedDuration;

pub type LocationId = usize;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Pairwise travel distances (km) and times between locations, stored as
/// flat row-major vectors for cache-friendly hot-loop lookups. Location 0
/// is the depot by convention.
#[derive(Debug, Clone)]
pub struct TravelMatrix {
    distances: Vec<f64>,
    travel_seconds: Vec<i64>,
    num_locations: usize,
    max_distance: f64,
}

impl TravelMatrix {
    pub fn new(distances: Vec<Vec<f64>>, travel_seconds: Vec<Vec<i64>>) -> Self {
        let num_locations = distances.len();
        debug_assert_eq!(travel_seconds.len(), num_locations);

        let distances: Vec<f64> = distances.into_iter().flatten().collect();
        let travel_seconds: Vec<i64> = travel_seconds.into_iter().flatten().collect();
        debug_assert_eq!(distances.len(), num_locations * num_locations);

        let max_distance = distances.iter().copied().fold(0.0_f64, f64::max);
        Self {
            distances,
            travel_seconds,
            num_locations,
            max_distance,
        }
    }

    /// Build from `(latitude, longitude)` coordinates using haversine
    /// distances, with travel times derived from an average speed.
    pub fn from_coordinates(coordinates: &[(f64, f64)], average_speed_kmh: f64) -> Self {
        let n = coordinates.len();
        let mut distances = vec![vec![0.0; n]; n];
        let mut travel_seconds = vec![vec![0_i64; n]; n];

        for from in 0..n {
            for to in 0..n {
                if from == to {
                    continue;
                }
                let km = haversine_km(coordinates[from], coordinates[to]);
                distances[from][to] = km;
                travel_seconds[from][to] = (km / average_speed_kmh * 3600.0).round() as i64;
            }
        }

        Self::new(distances, travel_seconds)
    }

    #[inline(always)]
    fn index(&self, from: LocationId, to: LocationId) -> usize {
        from * self.num_locations + to
    }

    /// Distance in kilometers.
    #[inline(always)]
    pub fn distance(&self, from: LocationId, to: LocationId) -> f64 {
        self.distances[self.index(from, to)]
    }

    #[inline(always)]
    pub fn travel_time(&self, from: LocationId, to: LocationId) -> SignedDuration {
        SignedDuration::from_secs(self.travel_seconds[self.index(from, to)])
    }

    pub fn len(&self) -> usize {
        self.num_locations
    }

    pub fn is_empty(&self) -> bool {
        self.num_locations == 0
    }

    /// Largest pairwise distance, used to normalize relatedness terms.
    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }
}

fn haversine_km((lat1, lon1): (f64, f64), (lat2, lon2): (f64, f64)) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}
