mod request_tracking;

pub use request_tracking::{
    RequestId, RequestIdRootSpan, RequestTracking, REQUEST_ID_HEADER, RESPONSE_TIME_HEADER,
    SLOW_REQUEST_THRESHOLD,
};
