//! Device location capability consumed by
//! [`PlaceKitClient::request_geolocation`](crate::PlaceKitClient::request_geolocation).
//!
//! The client never talks to a positioning provider itself. Hosts plug one in
//! through [`DeviceLocation`], which follows a success/error callback contract
//! so it can wrap browser or OS APIs directly.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::{PlaceKitError, Result};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// `"lat,lng"`, the format of the `coordinates` option.
    pub fn to_param(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Failure reported by a [`DeviceLocation`] provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionError {
    pub code: u16,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout_ms: Option<u64>,
    pub maximum_age_ms: Option<u64>,
}

pub type PositionCallback = Box<dyn FnOnce(Coordinates) + Send>;
pub type PositionErrorCallback = Box<dyn FnOnce(PositionError) + Send>;

/// Source of the device position.
///
/// Implementations call exactly one of the callbacks, possibly later and from
/// another thread. Dropping both without calling either is reported as an
/// error.
pub trait DeviceLocation: Send + Sync {
    fn current_position(
        &self,
        on_success: PositionCallback,
        on_error: PositionErrorCallback,
        options: &PositionOptions,
    );
}

/// Code used when the provider dropped its callbacks without answering.
pub(crate) const POSITION_UNAVAILABLE: u16 = 2;

/// Adapts the callback contract into a future.
pub(crate) async fn locate(
    device: &dyn DeviceLocation,
    options: &PositionOptions,
) -> Result<Coordinates> {
    let (tx, rx) = oneshot::channel::<std::result::Result<Coordinates, PositionError>>();
    let tx = Arc::new(Mutex::new(Some(tx)));
    let tx_error = Arc::clone(&tx);

    device.current_position(
        Box::new(move |coords: Coordinates| send_once(&tx, Ok(coords))),
        Box::new(move |err: PositionError| send_once(&tx_error, Err(err))),
        options,
    );

    match rx.await {
        Ok(Ok(coords)) => Ok(coords),
        Ok(Err(err)) => Err(PlaceKitError::Geolocation {
            code: err.code,
            message: err.message,
        }),
        Err(_) => Err(PlaceKitError::Geolocation {
            code: POSITION_UNAVAILABLE,
            message: "location provider dropped the request without answering".to_owned(),
        }),
    }
}

type PositionSender = oneshot::Sender<std::result::Result<Coordinates, PositionError>>;

fn send_once(
    slot: &Mutex<Option<PositionSender>>,
    value: std::result::Result<Coordinates, PositionError>,
) {
    let sender = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(sender) = sender {
        let _ = sender.send(value);
    }
}

#[cfg(test)]
mod tests {
    use super::{
        locate, Coordinates, DeviceLocation, PositionCallback, PositionError,
        PositionErrorCallback, PositionOptions,
    };
    use crate::PlaceKitError;

    struct Fixed(Result<Coordinates, PositionError>);

    impl DeviceLocation for Fixed {
        fn current_position(
            &self,
            on_success: PositionCallback,
            on_error: PositionErrorCallback,
            _options: &PositionOptions,
        ) {
            match self.0.clone() {
                Ok(coords) => on_success(coords),
                Err(err) => on_error(err),
            }
        }
    }

    struct Silent;

    impl DeviceLocation for Silent {
        fn current_position(
            &self,
            _on_success: PositionCallback,
            _on_error: PositionErrorCallback,
            _options: &PositionOptions,
        ) {
        }
    }

    #[test]
    fn coordinates_format_as_lat_lng() {
        let coords = Coordinates {
            latitude: 48.86,
            longitude: 2.29,
        };
        assert_eq!(coords.to_param(), "48.86,2.29");
    }

    #[tokio::test]
    async fn success_callback_resolves() {
        let coords = Coordinates {
            latitude: 1.5,
            longitude: -3.0,
        };
        let got = locate(&Fixed(Ok(coords)), &PositionOptions::default())
            .await
            .expect("must locate");
        assert_eq!(got, coords);
    }

    #[tokio::test]
    async fn error_callback_maps_code_and_message() {
        let err = locate(
            &Fixed(Err(PositionError {
                code: 1,
                message: "denied".to_owned(),
            })),
            &PositionOptions::default(),
        )
        .await
        .expect_err("must fail");
        match err {
            PlaceKitError::Geolocation { code, message } => {
                assert_eq!(code, 1);
                assert_eq!(message, "denied");
            }
            other => panic!("expected geolocation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dropped_callbacks_are_an_error() {
        let err = locate(&Silent, &PositionOptions::default())
            .await
            .expect_err("must fail");
        assert!(matches!(err, PlaceKitError::Geolocation { .. }));
    }
}
