//! End to end exercises of the service handlers through the dispatcher

use crate::did::DidValue;
use crate::sim::EcuSimulator;

fn sim() -> EcuSimulator {
    let _ = env_logger::try_init();
    EcuSimulator::new()
}

#[test]
fn tester_present() {
    let mut sim = sim();
    assert_eq!(sim.handle_request(&[0x3E, 0x00]), Some(vec![0x7E, 0x00]));
}

#[test]
fn tester_present_suppressed() {
    let mut sim = sim();
    assert_eq!(sim.handle_request(&[0x3E, 0x80]), None);
}

#[test]
fn session_control_extended() {
    let mut sim = sim();
    // P2 = 5000ms = 0x1388, P2* = 2000ms / 10 = 0x00C8
    assert_eq!(
        sim.handle_request(&[0x10, 0x03]),
        Some(vec![0x50, 0x03, 0x13, 0x88, 0x00, 0xC8])
    );
}

#[test]
fn session_control_unknown_type() {
    let mut sim = sim();
    assert_eq!(sim.handle_request(&[0x10, 0x05]), Some(vec![0x7F, 0x10, 0x31]));
}

#[test]
fn session_control_suppressed() {
    let mut sim = sim();
    assert_eq!(sim.handle_request(&[0x10, 0x83]), None);
    // Negative responses are transmitted even with the suppress bit set
    assert_eq!(sim.handle_request(&[0x10, 0x85]), Some(vec![0x7F, 0x10, 0x31]));
}

#[test]
fn ecu_reset_types() {
    let mut sim = sim();
    assert_eq!(sim.handle_request(&[0x11, 0x01]), Some(vec![0x51, 0x01]));
    // enableRapidPowerShutDown answers with the stand-by time
    assert_eq!(sim.handle_request(&[0x11, 0x04]), Some(vec![0x51, 0x04, 0x3B]));
    // An unknown reset type is logged but still echoed
    assert_eq!(sim.handle_request(&[0x11, 0x29]), Some(vec![0x51, 0x29]));
}

#[test]
fn ecu_reset_suppressed() {
    let mut sim = sim();
    assert_eq!(sim.handle_request(&[0x11, 0x81]), None);
}

#[test]
fn security_access_seed_then_key() {
    let mut sim = sim();
    assert_eq!(
        sim.handle_request(&[0x27, 0x01]),
        Some(vec![0x67, 0x01, 0x01, 0x02, 0x03, 0x04])
    );
    assert_eq!(sim.handle_request(&[0x27, 0x02]), Some(vec![0x67, 0x02]));

    // Level 3: seed sub-function 0x05, key echo 0x06
    assert_eq!(
        sim.handle_request(&[0x27, 0x05]),
        Some(vec![0x67, 0x05, 0x01, 0x02, 0x03, 0x04])
    );
    assert_eq!(sim.handle_request(&[0x27, 0x06]), Some(vec![0x67, 0x06]));
}

#[test]
fn security_access_suppressed_seed_still_recorded() {
    let mut sim = sim();
    assert_eq!(sim.handle_request(&[0x27, 0x83]), None);
    assert_eq!(sim.handle_request(&[0x27, 0x04]), Some(vec![0x67, 0x04]));
}

#[test]
fn security_access_unknown_sub_function() {
    let mut sim = sim();
    assert_eq!(sim.handle_request(&[0x27, 0x09]), Some(vec![0x7F, 0x27, 0x31]));
}

#[test]
fn communication_control() {
    let mut sim = sim();
    assert_eq!(sim.handle_request(&[0x28, 0x00, 0x01]), Some(vec![0x68, 0x00]));
    assert_eq!(sim.handle_request(&[0x28, 0x03, 0x01]), Some(vec![0x68, 0x03]));
    assert_eq!(
        sim.handle_request(&[0x28, 0x05, 0x01]),
        Some(vec![0x7F, 0x28, 0x31])
    );
}

#[test]
fn control_dtc_setting() {
    let mut sim = sim();
    assert_eq!(sim.handle_request(&[0x85, 0x02]), Some(vec![0xC5, 0x02]));
    assert_eq!(sim.handle_request(&[0x85, 0x03]), Some(vec![0x7F, 0x85, 0x31]));
    assert_eq!(sim.handle_request(&[0x85, 0x81]), None);
}

#[test]
fn read_did_vin() {
    let mut sim = sim();
    let resp = sim.handle_request(&[0x22, 0xF1, 0x91]).unwrap();
    let mut expected = vec![0x62, 0xF1, 0x91];
    expected.extend_from_slice(b"FVB30FKA034ALDFA0");
    assert_eq!(resp, expected);
}

#[test]
fn read_did_multiple_in_request_order() {
    let mut sim = sim();
    assert_eq!(
        sim.handle_request(&[0x22, 0x00, 0x21, 0x00, 0x51]),
        Some(vec![0x62, 0x00, 0x21, 0xC8, 0x00, 0x51, 0x2F, 0xA8])
    );
}

#[test]
fn read_did_unknown() {
    let mut sim = sim();
    assert_eq!(
        sim.handle_request(&[0x22, 0x12, 0x34]),
        Some(vec![0x7F, 0x22, 0x31])
    );
    // One bad DID rejects the whole list
    assert_eq!(
        sim.handle_request(&[0x22, 0xF1, 0x91, 0x12, 0x34]),
        Some(vec![0x7F, 0x22, 0x31])
    );
}

#[test]
fn read_did_malformed_list() {
    let mut sim = sim();
    // Odd byte count
    assert_eq!(
        sim.handle_request(&[0x22, 0xF1, 0x91, 0x00]),
        Some(vec![0x7F, 0x22, 0x31])
    );
    // No DID at all
    assert_eq!(sim.handle_request(&[0x22]), Some(vec![0x7F, 0x22, 0x31]));
}

#[test]
fn write_did_then_read_back() {
    let mut sim = sim();
    // Raw 0x64 = 100, physical 100 * 0.5 = 50.0
    assert_eq!(
        sim.handle_request(&[0x2E, 0x00, 0x21, 0x64]),
        Some(vec![0x6E, 0x00, 0x21])
    );
    assert_eq!(
        sim.handle_request(&[0x22, 0x00, 0x21]),
        Some(vec![0x62, 0x00, 0x21, 0x64])
    );
    assert_eq!(
        sim.did_table().value(0x0021),
        Some(DidValue::Float(50.0))
    );
}

#[test]
fn write_did_rejections() {
    let mut sim = sim();
    // Unknown DID
    assert_eq!(
        sim.handle_request(&[0x2E, 0x12, 0x34, 0x00]),
        Some(vec![0x7F, 0x2E, 0x31])
    );
    // DID without any data byte
    assert_eq!(
        sim.handle_request(&[0x2E, 0x00, 0x51]),
        Some(vec![0x7F, 0x2E, 0x31])
    );
    // Fewer data bytes than the codec width
    assert_eq!(
        sim.handle_request(&[0x2E, 0x00, 0x51, 0x2F]),
        Some(vec![0x7F, 0x2E, 0x31])
    );
}

#[test]
fn clear_dtc_all_groups() {
    let mut sim = sim();
    assert_eq!(sim.dtc_store().len(), 3);
    assert_eq!(sim.handle_request(&[0x14, 0xFF, 0xFF, 0xFF]), Some(vec![0x54]));
    assert!(sim.dtc_store().query_by_mask(0xFF).is_empty());
}

#[test]
fn clear_dtc_specific_group_is_a_no_op() {
    let mut sim = sim();
    assert_eq!(sim.handle_request(&[0x14, 0x00, 0x01, 0x02]), Some(vec![0x54]));
    assert_eq!(sim.dtc_store().len(), 3);
}

#[test]
fn clear_dtc_short_request() {
    let mut sim = sim();
    assert_eq!(sim.handle_request(&[0x14, 0xFF]), Some(vec![0x7F, 0x14, 0x10]));
}

#[test]
fn read_dtc_by_status_mask() {
    let mut sim = sim();
    assert_eq!(
        sim.handle_request(&[0x19, 0x02, 0xFF]),
        Some(vec![
            0x59, 0x02, 0xFF, // Availability mask
            0x00, 0x01, 0x02, 0xCD, // (1, 2) status 0xCD
            0x02, 0x35, 0x0C, 0xFE, // (0x235, 12) status 0xFE
            0xD9, 0x82, 0x0F, 0x2E, // (0xD982, 15) status 0x2E
        ])
    );
}

#[test]
fn read_dtc_mask_filters() {
    let mut sim = sim();
    // Only the first seeded DTC has testFailed set
    assert_eq!(
        sim.handle_request(&[0x19, 0x02, 0x01]),
        Some(vec![0x59, 0x02, 0xFF, 0x00, 0x01, 0x02, 0xCD])
    );
    // No DTC matches a zero mask
    assert_eq!(
        sim.handle_request(&[0x19, 0x02, 0x00]),
        Some(vec![0x59, 0x02, 0xFF])
    );
}

#[test]
fn read_dtc_rejections() {
    let mut sim = sim();
    // Too short for a status mask
    assert_eq!(sim.handle_request(&[0x19, 0x02]), Some(vec![0x7F, 0x19, 0x10]));
    // Unhandled report type
    assert_eq!(
        sim.handle_request(&[0x19, 0x0A, 0x00]),
        Some(vec![0x7F, 0x19, 0x31])
    );
}

#[test]
fn routine_erase_flash_arms_download_state() {
    let mut sim = sim();
    // Leave stale transfer state behind to prove the reset
    {
        let flash = sim.flash_state();
        let mut flash = flash.lock().unwrap();
        flash.active = true;
        flash.bytes_received = 99;
    }
    assert_eq!(
        sim.handle_request(&[
            0x31, 0x01, 0x11, 0x22, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00
        ]),
        Some(vec![0x71, 0x01, 0x11, 0x22, 0x01])
    );
    let flash = sim.flash_state();
    let flash = flash.lock().unwrap();
    assert!(!flash.active);
    assert_eq!(flash.bytes_received, 0);
    assert_eq!(flash.erase_start_address, 0x0001_0000);
    assert_eq!(flash.erase_size, 0x1000);
}

#[test]
fn routine_check_memory() {
    let mut sim = sim();
    assert_eq!(
        sim.handle_request(&[0x31, 0x01, 0x33, 0x44]),
        Some(vec![0x71, 0x01, 0x33, 0x44, 0x01])
    );
}

#[test]
fn routine_silent_paths() {
    let mut sim = sim();
    // Stop and results are ignored
    assert_eq!(sim.handle_request(&[0x31, 0x02, 0x11, 0x22]), None);
    assert_eq!(sim.handle_request(&[0x31, 0x03, 0x11, 0x22]), None);
    // Unknown routine identifier
    assert_eq!(sim.handle_request(&[0x31, 0x01, 0xAB, 0xCD]), None);
}

#[test]
fn request_download_accepted() {
    let mut sim = sim();
    assert_eq!(
        sim.handle_request(&[
            0x34, 0x00, 0x44, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00
        ]),
        Some(vec![0x74, 0x20, 0x0F, 0xFF])
    );
    let flash = sim.flash_state();
    let flash = flash.lock().unwrap();
    assert!(flash.active);
    assert_eq!(flash.start_address, 0x0001_0000);
    assert_eq!(flash.transferred_size, 0x1000);
}

#[test]
fn request_download_short_request_resets() {
    let mut sim = sim();
    sim.handle_request(&[0x34, 0x00, 0x44, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00]);
    assert_eq!(
        sim.handle_request(&[0x34, 0x00, 0x44, 0x00, 0x01]),
        Some(vec![0x7F, 0x34, 0x10])
    );
    assert!(!sim.flash_state().lock().unwrap().active);
}

#[test]
fn transfer_data_sequence_error_aborts() {
    let mut sim = sim();
    sim.handle_request(&[0x34, 0x00, 0x44, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00]);
    assert_eq!(
        sim.handle_request(&[0x36, 0x01, 0xAA, 0xBB]),
        Some(vec![0x76, 0x01])
    );
    // Counter 0x03 does not follow 0x01
    assert_eq!(
        sim.handle_request(&[0x36, 0x03, 0xCC, 0xDD]),
        Some(vec![0x7F, 0x36, 0x24])
    );
    let flash = sim.flash_state();
    let flash = flash.lock().unwrap();
    assert!(!flash.active);
    assert!(flash.buffer.is_empty());
}

#[test]
fn transfer_data_accumulates_blocks() {
    let mut sim = sim();
    sim.handle_request(&[0x34, 0x00, 0x44, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00]);
    for counter in 1..=3u8 {
        assert_eq!(
            sim.handle_request(&[0x36, counter, 0x10 + counter, 0x20 + counter]),
            Some(vec![0x76, counter])
        );
    }
    let flash = sim.flash_state();
    let flash = flash.lock().unwrap();
    assert_eq!(flash.bytes_received, 6);
    assert_eq!(flash.block_counter, 3);
    assert_eq!(flash.buffer, vec![0x11, 0x21, 0x12, 0x22, 0x13, 0x23]);
}

#[test]
fn transfer_data_block_counter_wraps() {
    let mut sim = sim();
    sim.handle_request(&[0x34, 0x00, 0x44, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00]);
    sim.flash_state().lock().unwrap().block_counter = 0xFE;
    assert_eq!(sim.handle_request(&[0x36, 0xFF, 0x01]), Some(vec![0x76, 0xFF]));
    // After block 0xFF the next expected counter is 0x00
    assert_eq!(sim.handle_request(&[0x36, 0x00, 0x02]), Some(vec![0x76, 0x00]));
    assert_eq!(sim.flash_state().lock().unwrap().block_counter, 0x00);
}

#[test]
fn transfer_exit() {
    let mut sim = sim();
    assert_eq!(sim.handle_request(&[0x37]), Some(vec![0x77]));
}

#[test]
fn request_upload_rejected() {
    let mut sim = sim();
    assert_eq!(sim.handle_request(&[0x35, 0x01]), Some(vec![0x7F, 0x35, 0x10]));
}

#[test]
fn positive_and_negative_response_shape() {
    let mut sim = sim();
    for (req, ok) in [
        (vec![0x3E, 0x00], true),
        (vec![0x10, 0x01], true),
        (vec![0x22, 0x12, 0x34], false),
        (vec![0x85, 0x07], false),
    ] {
        let resp = sim.handle_request(&req).unwrap();
        if ok {
            assert_eq!(resp[0], req[0] + 0x40);
        } else {
            assert_eq!(resp[0], 0x7F);
            assert_eq!(resp[1], req[0]);
        }
    }
}
