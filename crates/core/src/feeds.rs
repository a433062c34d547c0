use url::Url;

/// A real-time feed that can be relayed from its upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    /// GTFS-realtime trip updates.
    TripUpdates,
    /// GTFS-realtime vehicle positions.
    VehiclePositions,
    /// GTFS-realtime service alerts.
    Alerts,
}

impl Feed {
    /// Every feed served by the relay.
    pub const ALL: [Feed; 3] = [Feed::TripUpdates, Feed::VehiclePositions, Feed::Alerts];

    /// The name the feed is published under, which is also its file name on the server.
    pub const fn name(self) -> &'static str {
        match self {
            Feed::TripUpdates => "tripupdates.pb",
            Feed::VehiclePositions => "vehicleupdates.pb",
            Feed::Alerts => "alerts.pb",
        }
    }

    /// The route this feed is served from.
    pub const fn route(self) -> &'static str {
        match self {
            Feed::TripUpdates => "/tripupdates.pb",
            Feed::VehiclePositions => "/vehicleupdates.pb",
            Feed::Alerts => "/alerts.pb",
        }
    }
}

/// A feed resolved against its configured upstream.
#[derive(Debug, Clone, Copy)]
pub struct FeedSpec<'a> {
    /// See [`Feed::name`].
    pub name: &'static str,
    /// Where the feed is fetched from.
    pub upstream: &'a Url,
}

/// Upstream locations for each [`Feed`], fixed for the lifetime of the server.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Upstream for [`Feed::TripUpdates`].
    pub trip_updates: Url,
    /// Upstream for [`Feed::VehiclePositions`].
    pub vehicle_positions: Url,
    /// Upstream for [`Feed::Alerts`].
    pub alerts: Url,
}

impl FeedSettings {
    /// Default upstream for [`Feed::TripUpdates`].
    pub const DEFAULT_TRIP_UPDATES_URL: &'static str =
        "https://bct.tmix.se/gtfs-realtime/tripupdates.pb?operatorIds=48";
    /// Default upstream for [`Feed::VehiclePositions`].
    pub const DEFAULT_VEHICLE_POSITIONS_URL: &'static str =
        "https://bct.tmix.se/gtfs-realtime/vehicleupdates.pb?operatorIds=48";
    /// Default upstream for [`Feed::Alerts`].
    pub const DEFAULT_ALERTS_URL: &'static str =
        "https://bct.tmix.se/gtfs-realtime/alerts.pb?operatorIds=48";

    /// The configured upstream for the given feed.
    pub fn upstream(&self, feed: Feed) -> &Url {
        match feed {
            Feed::TripUpdates => &self.trip_updates,
            Feed::VehiclePositions => &self.vehicle_positions,
            Feed::Alerts => &self.alerts,
        }
    }

    /// Resolve a [`FeedSpec`] for the given feed.
    pub fn spec(&self, feed: Feed) -> FeedSpec<'_> {
        FeedSpec {
            name: feed.name(),
            upstream: self.upstream(feed),
        }
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            trip_updates: Url::parse(Self::DEFAULT_TRIP_UPDATES_URL)
                .expect("default trip updates url should be valid"),
            vehicle_positions: Url::parse(Self::DEFAULT_VEHICLE_POSITIONS_URL)
                .expect("default vehicle positions url should be valid"),
            alerts: Url::parse(Self::DEFAULT_ALERTS_URL)
                .expect("default alerts url should be valid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Feed, FeedSettings};
    use url::Url;

    #[test]
    fn test_feed_routes_match_names() {
        for feed in Feed::ALL {
            assert_eq!(feed.route(), format!("/{}", feed.name()));
        }
    }

    #[test]
    fn test_spec_resolves_configured_upstream() {
        let settings = FeedSettings {
            alerts: Url::parse("http://127.0.0.1:9000/alerts").unwrap(),
            ..FeedSettings::default()
        };

        let spec = settings.spec(Feed::Alerts);
        assert_eq!(spec.name, "alerts.pb");
        assert_eq!(spec.upstream.as_str(), "http://127.0.0.1:9000/alerts");

        // Other feeds keep their defaults.
        assert_eq!(
            settings.upstream(Feed::TripUpdates).as_str(),
            FeedSettings::DEFAULT_TRIP_UPDATES_URL
        );
        assert_eq!(
            settings.upstream(Feed::VehiclePositions).as_str(),
            FeedSettings::DEFAULT_VEHICLE_POSITIONS_URL
        );
    }
}
