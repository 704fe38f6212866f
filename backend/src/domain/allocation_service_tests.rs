//! Tests for the allocation service entry, quote and settle rules.

use std::sync::Arc;

use chrono::{Duration, TimeZone};
use mockall::Sequence;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockSessionLedger, MockSlotRegistry};
use crate::domain::{PaymentStatus, SessionCloseError};
use crate::test_support::MutableClock;

fn entry_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::new(entry_time()))
}

fn slot_id(raw: &str) -> SlotId {
    raw.parse().expect("valid slot id")
}

fn entry_request(plate: &str, class: VehicleClass, slot: &str) -> EnterVehicleRequest {
    EnterVehicleRequest {
        owner_name: "Asha Rao".to_owned(),
        owner_mobile: "9000000000".to_owned(),
        plate_number: plate.to_owned(),
        vehicle_class: class,
        slot_id: slot.to_owned(),
    }
}

fn active_session(plate: &str, slot: &str) -> ParkingSession {
    let plate = PlateNumber::new(plate).expect("plate");
    let slot_id = slot_id(slot);
    ParkingSession::open(ParkingSessionDraft {
        id: SessionId::derive(&plate, entry_time(), 0),
        owner_name: OwnerName::new("Asha Rao").expect("name"),
        owner_mobile: MobileNumber::new("9000000000").expect("mobile"),
        plate,
        vehicle_class: slot_id.vehicle_class(),
        slot_id,
        entry_time: entry_time(),
    })
    .expect("valid session")
}

fn service(
    slots: MockSlotRegistry,
    ledger: MockSessionLedger,
    clock: Arc<MutableClock>,
) -> AllocationService<MockSlotRegistry, MockSessionLedger> {
    AllocationService::new(Arc::new(slots), Arc::new(ledger), clock)
}

fn ledger_without_sessions() -> MockSessionLedger {
    let mut ledger = MockSessionLedger::new();
    ledger
        .expect_find_active_by_plate()
        .returning(|_| Ok(None));
    ledger.expect_find_by_id().returning(|_| Ok(None));
    ledger
}

fn registry_with(slot: Slot) -> MockSlotRegistry {
    let mut slots = MockSlotRegistry::new();
    slots
        .expect_find()
        .returning(move |_| Ok(Some(slot.clone())));
    slots
}

#[rstest]
#[tokio::test]
async fn enter_occupies_slot_and_creates_session(clock: Arc<MutableClock>) {
    let mut seq = Sequence::new();
    let mut slots = registry_with(Slot::vacant(slot_id("4W-03")));
    slots
        .expect_occupy()
        .withf(|slot, session| {
            slot.to_string() == "4W-03" && session.as_ref() == "KA05CD5678-20240301090000"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    let mut ledger = ledger_without_sessions();
    ledger
        .expect_create()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let session = service(slots, ledger, clock)
        .enter_vehicle(entry_request(" ka05cd5678 ", VehicleClass::FourWheeler, "4W-03"))
        .await
        .expect("entry succeeds");

    assert_eq!(session.plate().as_ref(), "KA05CD5678");
    assert_eq!(session.entry_time(), entry_time());
    assert!(session.is_active());
}

#[rstest]
#[tokio::test]
async fn enter_rejects_plate_with_active_session(clock: Arc<MutableClock>) {
    let mut slots = MockSlotRegistry::new();
    slots.expect_occupy().times(0);
    let mut ledger = MockSessionLedger::new();
    ledger
        .expect_find_active_by_plate()
        .returning(|_| Ok(Some(active_session("KA05CD5678", "4W-01"))));
    ledger.expect_create().times(0);

    let err = service(slots, ledger, clock)
        .enter_vehicle(entry_request("KA05CD5678", VehicleClass::FourWheeler, "4W-02"))
        .await
        .expect_err("duplicate entry");

    assert_eq!(
        err,
        ParkingError::vehicle_already_parked("KA05CD5678", slot_id("4W-01"))
    );
}

#[rstest]
#[case("4W-99")]
#[case("4W-1")]
#[tokio::test]
async fn enter_rejects_unknown_slot(clock: Arc<MutableClock>, #[case] raw_slot: &str) {
    let mut slots = MockSlotRegistry::new();
    slots.expect_find().returning(|_| Ok(None));
    slots.expect_occupy().times(0);

    let err = service(slots, ledger_without_sessions(), clock)
        .enter_vehicle(entry_request("AB1", VehicleClass::FourWheeler, raw_slot))
        .await
        .expect_err("unknown slot");

    assert_eq!(err, ParkingError::slot_not_found(raw_slot));
}

#[rstest]
#[tokio::test]
async fn enter_rejects_occupied_slot(clock: Arc<MutableClock>) {
    let occupant = SessionId::parse("XY9-20240301080000").expect("session id");
    let slots = registry_with(Slot::from_parts(slot_id("2W-05"), Some(occupant.clone())));

    let err = service(slots, ledger_without_sessions(), clock)
        .enter_vehicle(entry_request("AB1", VehicleClass::TwoWheeler, "2W-05"))
        .await
        .expect_err("occupied slot");

    assert_eq!(err, ParkingError::slot_occupied(slot_id("2W-05"), occupant));
}

#[rstest]
#[tokio::test]
async fn enter_rejects_class_mismatch(clock: Arc<MutableClock>) {
    let slots = registry_with(Slot::vacant(slot_id("4W-01")));

    let err = service(slots, ledger_without_sessions(), clock)
        .enter_vehicle(entry_request("AB1", VehicleClass::TwoWheeler, "4W-01"))
        .await
        .expect_err("class mismatch");

    assert_eq!(
        err,
        ParkingError::vehicle_class_mismatch(
            slot_id("4W-01"),
            VehicleClass::FourWheeler,
            VehicleClass::TwoWheeler,
        )
    );
}

#[rstest]
#[case(entry_request("AB 1", VehicleClass::TwoWheeler, "2W-01"))]
#[case(EnterVehicleRequest { owner_name: " ".to_owned(), ..entry_request("AB1", VehicleClass::TwoWheeler, "2W-01") })]
#[case(EnterVehicleRequest { owner_mobile: "12".to_owned(), ..entry_request("AB1", VehicleClass::TwoWheeler, "2W-01") })]
#[tokio::test]
async fn enter_rejects_invalid_values_before_storage(
    clock: Arc<MutableClock>,
    #[case] request: EnterVehicleRequest,
) {
    let err = service(MockSlotRegistry::new(), MockSessionLedger::new(), clock)
        .enter_vehicle(request)
        .await
        .expect_err("invalid request");

    assert!(matches!(err, ParkingError::InvalidRequest { .. }));
}

#[rstest]
#[tokio::test]
async fn enter_releases_slot_when_create_fails(clock: Arc<MutableClock>) {
    let mut slots = registry_with(Slot::vacant(slot_id("2W-01")));
    slots.expect_occupy().times(1).returning(|_, _| Ok(()));
    slots
        .expect_release()
        .withf(|slot| slot.to_string() == "2W-01")
        .times(1)
        .returning(|_| Ok(()));
    let mut ledger = ledger_without_sessions();
    ledger
        .expect_create()
        .times(1)
        .returning(|_| Err(SessionLedgerError::duplicate_active_session("AB1")));

    let err = service(slots, ledger, clock)
        .enter_vehicle(entry_request("AB1", VehicleClass::TwoWheeler, "2W-01"))
        .await
        .expect_err("create fails");

    assert_eq!(err, ParkingError::duplicate_active_session("AB1"));
}

#[rstest]
#[tokio::test]
async fn enter_maps_connection_failure_to_storage(clock: Arc<MutableClock>) {
    let slots = MockSlotRegistry::new();
    let mut ledger = MockSessionLedger::new();
    ledger
        .expect_find_active_by_plate()
        .returning(|_| Err(SessionLedgerError::connection("pool exhausted")));

    let err = service(slots, ledger, clock)
        .enter_vehicle(entry_request("AB1", VehicleClass::TwoWheeler, "2W-01"))
        .await
        .expect_err("storage failure");

    assert!(err.is_storage());
}

#[rstest]
#[tokio::test]
async fn enter_suffixes_colliding_session_ids(clock: Arc<MutableClock>) {
    let mut slots = registry_with(Slot::vacant(slot_id("2W-01")));
    slots.expect_occupy().returning(|_, _| Ok(()));
    let mut ledger = MockSessionLedger::new();
    ledger
        .expect_find_active_by_plate()
        .returning(|_| Ok(None));
    ledger.expect_find_by_id().returning(|id| {
        if id.as_ref() == "AB1-20240301090000" {
            Ok(Some(active_session("AB1", "2W-02")))
        } else {
            Ok(None)
        }
    });
    ledger.expect_create().returning(|_| Ok(()));

    let session = service(slots, ledger, clock)
        .enter_vehicle(entry_request("AB1", VehicleClass::TwoWheeler, "2W-01"))
        .await
        .expect("entry succeeds");

    assert_eq!(session.id().as_ref(), "AB1-20240301090000-1");
}

#[rstest]
#[tokio::test]
async fn quote_reads_without_mutating(clock: Arc<MutableClock>) {
    let mut slots = MockSlotRegistry::new();
    slots.expect_release().times(0);
    let mut ledger = MockSessionLedger::new();
    ledger
        .expect_find_active_by_id()
        .returning(|_| Ok(Some(active_session("AB1", "4W-01"))));
    ledger.expect_close_session().times(0);
    clock.advance_seconds(90 * 60);

    let quote = service(slots, ledger, clock)
        .quote_exit("AB1-20240301090000")
        .await
        .expect("quote succeeds");

    assert_eq!(quote, FeeQuote {
        fee: 120,
        duration_hours: 2
    });
}

#[rstest]
#[tokio::test]
async fn quote_rejects_exit_before_entry(clock: Arc<MutableClock>) {
    let mut ledger = MockSessionLedger::new();
    ledger
        .expect_find_active_by_id()
        .returning(|_| Ok(Some(active_session("AB1", "4W-01"))));
    clock.advance_seconds(-60);

    let err = service(MockSlotRegistry::new(), ledger, clock)
        .quote_exit("AB1-20240301090000")
        .await
        .expect_err("negative duration");

    assert!(matches!(err, ParkingError::InvalidTimeRange { .. }));
}

#[rstest]
#[case("AB1-20240301090000")]
#[case("not a session")]
#[tokio::test]
async fn quote_reports_missing_session(clock: Arc<MutableClock>, #[case] raw: &str) {
    let mut ledger = MockSessionLedger::new();
    ledger.expect_find_active_by_id().returning(|_| Ok(None));

    let err = service(MockSlotRegistry::new(), ledger, clock)
        .quote_exit(raw)
        .await
        .expect_err("missing session");

    assert!(matches!(err, ParkingError::SessionNotFound { .. }));
}

fn settle_request(method: PaymentMethod) -> SettleExitRequest {
    SettleExitRequest {
        session_id: "AB1-20240301090000".to_owned(),
        payment_method: method,
        payment_status: PaymentStatus::Completed,
    }
}

#[rstest]
#[tokio::test]
async fn settle_closes_session_then_releases_slot(clock: Arc<MutableClock>) {
    let mut seq = Sequence::new();
    let mut ledger = MockSessionLedger::new();
    ledger
        .expect_find_active_by_id()
        .returning(|_| Ok(Some(active_session("AB1", "2W-04"))));
    ledger
        .expect_close_session()
        .withf(|_, closure| closure.fee == 60 && closure.duration_hours == 2)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, closure| {
            let mut session = active_session("AB1", "2W-04");
            session
                .close(closure.clone())
                .map_err(|err: SessionCloseError| SessionLedgerError::query(err.to_string()))?;
            Ok(session)
        });
    let mut slots = MockSlotRegistry::new();
    slots
        .expect_release()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    clock.advance_seconds(90 * 60);

    let receipt = service(slots, ledger, clock)
        .settle_exit(settle_request(PaymentMethod::QrCode))
        .await
        .expect("settle succeeds");

    assert_eq!(receipt.fee, 60);
    assert_eq!(receipt.duration_hours, 2);
    assert_eq!(
        receipt.message,
        "Vehicle exited after 2 hour(s). Payment of ₹60 received via QR code."
    );
    assert_eq!(receipt.exit_time, entry_time() + Duration::minutes(90));
}

#[rstest]
#[tokio::test]
async fn settle_reopens_session_when_release_fails(clock: Arc<MutableClock>) {
    let mut ledger = MockSessionLedger::new();
    ledger
        .expect_find_active_by_id()
        .returning(|_| Ok(Some(active_session("AB1", "2W-04"))));
    ledger
        .expect_close_session()
        .times(1)
        .returning(|_, _| Ok(active_session("AB1", "2W-04")));
    ledger
        .expect_reopen_session()
        .withf(|id| id.as_ref() == "AB1-20240301090000")
        .times(1)
        .returning(|_| Ok(()));
    let mut slots = MockSlotRegistry::new();
    slots
        .expect_release()
        .times(1)
        .returning(|_| Err(SlotRegistryError::connection("connection reset")));

    let err = service(slots, ledger, clock)
        .settle_exit(settle_request(PaymentMethod::Cash))
        .await
        .expect_err("release fails");

    assert!(err.is_storage());
}

#[rstest]
#[tokio::test]
async fn settle_of_closed_session_reports_not_found(clock: Arc<MutableClock>) {
    let mut ledger = MockSessionLedger::new();
    ledger.expect_find_active_by_id().returning(|_| Ok(None));
    ledger.expect_close_session().times(0);

    let err = service(MockSlotRegistry::new(), ledger, clock)
        .settle_exit(settle_request(PaymentMethod::Cash))
        .await
        .expect_err("already settled");

    assert_eq!(err, ParkingError::session_not_found("AB1-20240301090000"));
}

#[rstest]
#[tokio::test]
async fn custom_fee_schedule_is_applied(clock: Arc<MutableClock>) {
    let mut ledger = MockSessionLedger::new();
    ledger
        .expect_find_active_by_id()
        .returning(|_| Ok(Some(active_session("AB1", "2W-04"))));
    clock.advance_seconds(3 * 3600);

    let quote = service(MockSlotRegistry::new(), ledger, clock)
        .with_fee_schedule(FeeSchedule {
            two_wheeler_rate: 10,
            four_wheeler_rate: 20,
        })
        .quote_exit("AB1-20240301090000")
        .await
        .expect("quote succeeds");

    assert_eq!(quote.fee, 30);
}

#[rstest]
#[tokio::test]
async fn occupancy_summary_tallies_registry(clock: Arc<MutableClock>) {
    let mut slots = MockSlotRegistry::new();
    slots.expect_list_all().returning(|| {
        let mut catalogue = SlotCounts {
            two_wheeler: 2,
            four_wheeler: 1,
        }
        .catalogue();
        if let Some(slot) = catalogue.last_mut() {
            slot.set_occupant(SessionId::parse("AB1-20240301090000").ok());
        }
        Ok(catalogue)
    });

    let summary = service(slots, MockSessionLedger::new(), clock)
        .occupancy_summary()
        .await
        .expect("summary");

    let four_wheeler = summary
        .classes
        .iter()
        .find(|c| c.vehicle_class == VehicleClass::FourWheeler)
        .expect("four-wheeler totals");
    assert_eq!((four_wheeler.total, four_wheeler.occupied), (1, 1));
}

#[rstest]
#[tokio::test]
async fn initialize_passes_counts_to_registry(clock: Arc<MutableClock>) {
    let mut slots = MockSlotRegistry::new();
    slots
        .expect_initialize()
        .withf(|counts| counts.two_wheeler == 5 && counts.four_wheeler == 7)
        .times(1)
        .returning(|_| Ok(true));

    let created = service(slots, MockSessionLedger::new(), clock)
        .initialize_parking_lot(5, 7)
        .await
        .expect("initialise");

    assert!(created);
}
