//! Module for UDS negative response codes (ISO14229-1 annex A.1)
//!
//! Every negative response the simulator transmits has the wire shape
//! `[0x7F, request SID, NRC]`. This module holds the full NRC table, the
//! name lookup used for logging, and the set of NRCs any service may emit
//! regardless of its own supported table.

use strum_macros::{EnumIter, FromRepr, IntoStaticStr};

/// First byte of every negative response message
pub const NEGATIVE_RESPONSE_SID: u8 = 0x7F;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromRepr, EnumIter, IntoStaticStr)]
#[repr(u8)]
/// UDS negative response code definitions
///
/// Codes 0x38-0x3A carry their ISO14229:2020 secured-data-transmission
/// meaning rather than the overlapping ISO15764 names; the remainder of the
/// ISO15764 extended data link security block (0x3B-0x40) is kept as-is.
pub enum ResponseCode {
    /// Not a failure. Never transmitted inside a negative response message
    PositiveResponse = 0x00,
    /// ECU rejected the request (No specific error)
    GeneralReject = 0x10,
    /// Service is not supported by the ECU
    ServiceNotSupported = 0x11,
    /// Sub function is not supported by the ECU
    SubFunctionNotSupported = 0x12,
    /// Request message was an invalid length, or the format of the request
    /// was incorrect
    IncorrectMessageLengthOrInvalidFormat = 0x13,
    /// The response message is too long for the transport protocol
    ResponseTooLong = 0x14,
    /// The ECU is too busy to perform this request, and it should be sent
    /// again at a later time
    BusyRepeatRequest = 0x21,
    /// The requested action could not be performed due to the prerequisite
    /// conditions not being correct
    ConditionsNotCorrect = 0x22,
    /// The request has been sent in the incorrect order
    RequestSequenceError = 0x24,
    /// The ECU timed out trying to communicate with another component within
    /// the vehicle
    NoResponseFromSubnetComponent = 0x25,
    /// A failure of another component is preventing the execution of the
    /// request
    FailurePreventsExecutionOfRequestedAction = 0x26,
    /// The request message contains data outside of a valid range
    RequestOutOfRange = 0x31,
    /// The request could not be completed due to security access being denied
    SecurityAccessDenied = 0x33,
    /// The request requires the client to be authenticated first
    AuthenticationRequired = 0x34,
    /// The key sent during security access was invalid
    InvalidKey = 0x35,
    /// The client has tried to obtain security access to the ECU too many
    /// times with incorrect keys
    ExceedNumberOfAttempts = 0x36,
    /// The client has tried to request a seed too quickly, before the ECUs
    /// timeout period has expired
    RequiredTimeDelayNotExpired = 0x37,
    /// The request must be performed over a secured data link
    SecureDataTransmissionRequired = 0x38,
    /// The request must not be performed over a secured data link
    SecureDataTransmissionNotAllowed = 0x39,
    /// Verification of the secured data failed
    SecureDataVerificationFailed = 0x3A,
    /// ISO15764 - Termination with signature was requested
    TerminationWithSignatureRequested = 0x3B,
    /// ISO15764 - Access denied
    AccessDenied = 0x3C,
    /// ISO15764 - Version is not supported
    VersionNotSupported = 0x3D,
    /// ISO15764 - Secured link is not supported
    SecuredLinkNotSupported = 0x3E,
    /// ISO15764 - Certificate is not available
    CertificateNotAvailable = 0x3F,
    /// ISO15764 - Audit trail information is not available
    AuditTrailInformationNotAvailable = 0x40,
    /// Certificate verification failed - invalid time period
    CertificateVerificationFailedInvalidTimePeriod = 0x50,
    /// Certificate verification failed - invalid signature
    CertificateVerificationFailedInvalidSignature = 0x51,
    /// Certificate verification failed - invalid chain of trust
    CertificateVerificationFailedInvalidChainOfTrust = 0x52,
    /// Certificate verification failed - invalid type
    CertificateVerificationFailedInvalidType = 0x53,
    /// Certificate verification failed - invalid format
    CertificateVerificationFailedInvalidFormat = 0x54,
    /// Certificate verification failed - invalid content
    CertificateVerificationFailedInvalidContent = 0x55,
    /// Certificate verification failed - invalid scope
    CertificateVerificationFailedInvalidScope = 0x56,
    /// Certificate verification failed - certificate revoked
    CertificateVerificationFailedInvalidCertificate = 0x57,
    /// Ownership verification failed
    OwnershipVerificationFailed = 0x58,
    /// Challenge calculation failed
    ChallengeCalculationFailed = 0x59,
    /// Setting access rights failed
    SettingAccessRightsFailed = 0x5A,
    /// Session key creation or derivation failed
    SessionKeyCreationDerivationFailed = 0x5B,
    /// Usage of the configuration data failed
    ConfigurationDataUsageFailed = 0x5C,
    /// De-authentication failed
    DeAuthenticationFailed = 0x5D,
    /// The ECU cannot accept the requested upload/download due to a fault
    /// condition
    UploadDownloadNotAccepted = 0x70,
    /// The ECU has halted data transfer due to a fault condition
    TransferDataSuspended = 0x71,
    /// The ECU encountered an error during reprogramming (erasing / flashing)
    GeneralProgrammingFailure = 0x72,
    /// The blockSequenceCounter of a TransferData request was incorrect
    WrongBlockSequenceCounter = 0x73,
    /// The ECU has accepted the request, but cannot reply right now
    RequestCorrectlyReceivedResponsePending = 0x78,
    /// The sub function is not supported in the current diagnostic session
    /// mode
    SubFunctionNotSupportedInActiveSession = 0x7E,
    /// The service is not supported in the current diagnostic session mode
    ServiceNotSupportedInActiveSession = 0x7F,
    /// Engine RPM is too high
    RpmTooHigh = 0x81,
    /// Engine RPM is too low
    RpmTooLow = 0x82,
    /// Engine is running
    EngineIsRunning = 0x83,
    /// Engine is not running
    EngineIsNotRunning = 0x84,
    /// Engine has not been running for long enough
    EngineRunTimeTooLow = 0x85,
    /// Engine temperature (coolant) is too high
    TemperatureTooHigh = 0x86,
    /// Engine temperature (coolant) is too low
    TemperatureTooLow = 0x87,
    /// Vehicle speed is too high
    VehicleSpeedTooHigh = 0x88,
    /// Vehicle speed is too low
    VehicleSpeedTooLow = 0x89,
    /// Throttle or pedal value is too high
    ThrottlePedalTooHigh = 0x8A,
    /// Throttle or pedal value is too low
    ThrottlePedalTooLow = 0x8B,
    /// Transmission is not in neutral
    TransmissionRangeNotInNeutral = 0x8C,
    /// Transmission is not in gear
    TransmissionRangeNotInGear = 0x8D,
    /// Brake is not applied
    BrakeSwitchNotClosed = 0x8F,
    /// Shifter lever is not in park
    ShifterLeverNotInPark = 0x90,
    /// Automatic/CVT transmission torque converter is locked
    TorqueConverterClutchLocked = 0x91,
    /// Voltage is too high
    VoltageTooHigh = 0x92,
    /// Voltage is too low
    VoltageTooLow = 0x93,
    /// A resource needed to execute the request is temporarily unavailable
    ResourceTemporarilyNotAvailable = 0x94,
}

/// Negative response codes any service handler may transmit, in addition to
/// its own supported table (ISO14229:2020 figure 5, general server response
/// behaviour)
pub const ALWAYS_VALID_NEGATIVE_RESPONSES: &[ResponseCode] = &[
    ResponseCode::GeneralReject,
    ResponseCode::ServiceNotSupported,
    ResponseCode::ResponseTooLong,
    ResponseCode::BusyRepeatRequest,
    ResponseCode::NoResponseFromSubnetComponent,
    ResponseCode::FailurePreventsExecutionOfRequestedAction,
    ResponseCode::SecurityAccessDenied,
    ResponseCode::AuthenticationRequired,
    ResponseCode::SecureDataTransmissionRequired,
    ResponseCode::SecureDataTransmissionNotAllowed,
    ResponseCode::RequestCorrectlyReceivedResponsePending,
    ResponseCode::ServiceNotSupportedInActiveSession,
    ResponseCode::ResourceTemporarilyNotAvailable,
];

impl ResponseCode {
    /// Returns the symbolic name of a response code byte, or its decimal
    /// representation when the byte does not map to a known code
    pub fn name_of(code: u8) -> String {
        match Self::from_repr(code) {
            Some(rc) => <&'static str>::from(rc).to_string(),
            None => code.to_string(),
        }
    }

    /// Tells if a response code byte denotes a negative response.
    /// Unknown bytes and [ResponseCode::PositiveResponse] are not negative
    pub fn is_negative(code: u8) -> bool {
        matches!(Self::from_repr(code), Some(rc) if rc != Self::PositiveResponse)
    }
}
