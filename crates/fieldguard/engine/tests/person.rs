//! Scenario tests: a protected Person model driven through its own get/set
//! paths.

mod common;

use common::{person_protection, Person, PERSON_ATTRIBUTES};
use fieldguard_engine::{
    AccessKind, AttributeKey, Attributes, GuardSpec, Protected, ProtectError, ProtectionConfig,
    ProtectionRegistry,
};
use serde_json::json;

fn illegal_write(attribute: &str) -> ProtectError {
    ProtectError::IllegalWriteAccess {
        attribute: attribute.to_string(),
    }
}

#[test]
fn default_policy_locks_identity_after_persist() {
    let protection = person_protection(ProtectionConfig::default());
    let person = Person::new(&protection);

    person.set("id", 7).unwrap();
    assert_eq!(person.get("id").unwrap(), json!(7));
    person.set("created_at", "2024-05-01T10:00:00Z").unwrap();
    person.set("updated_at", "2024-05-01T10:00:00Z").unwrap();
    person.set("firstname", "Ada").unwrap();
    assert!(!person.is_persisted());
    person.persist().unwrap();
    assert!(person.is_persisted());

    assert_eq!(person.set("id", 8).unwrap_err(), illegal_write("id"));
    assert_eq!(
        person.set("created_at", "2025-01-01T00:00:00Z").unwrap_err(),
        illegal_write("created_at")
    );
    assert_eq!(person.get("id").unwrap(), json!(7));
    assert!(person.readable("id").unwrap());
    person.set("updated_at", "2024-06-01T08:30:00Z").unwrap();
    assert_eq!(person.raw("updated_at"), Some(json!("2024-06-01T08:30:00Z")));

    // Attributes outside the default policy stay open.
    person.set("firstname", "Grace").unwrap();
    assert_eq!(person.get("firstname").unwrap(), json!("Grace"));
}

#[test]
fn pm_is_only_readable_when_funny() {
    let protection = person_protection(ProtectionConfig::default());
    protection
        .permit("read", "pm", GuardSpec::when("funny"))
        .unwrap();

    let person = Person::new(&protection);
    person.set("pm", "knock knock").unwrap();

    let err = person.get("pm").unwrap_err();
    assert_eq!(err.to_string(), "READ 'pm' is NOT ALLOWED");
    assert!(!person.readable("pm").unwrap());

    person.funny.set(true);
    assert_eq!(person.get("pm").unwrap(), json!("knock knock"));
}

#[test]
fn contact_details_are_only_writable_when_serious() {
    let protection = person_protection(ProtectionConfig::default());
    protection
        .deny("write", ["phone", "email"], GuardSpec::unless("serious"))
        .unwrap();

    let person = Person::new(&protection);
    assert_eq!(person.set("phone", "555-0100").unwrap_err(), illegal_write("phone"));
    assert_eq!(person.raw("phone"), None);

    person.serious.set(true);
    person.set("phone", "555-0100").unwrap();
    person.set("email", "ada@example.org").unwrap();
    assert_eq!(person.raw("phone"), Some(json!("555-0100")));

    // Other kinds are untouched by a write denial.
    assert!(person.displayable("phone").unwrap());
    assert!(person.readable("email").unwrap());
}

#[test]
fn default_computation_may_write_denied_attributes() {
    let protection = person_protection(ProtectionConfig::default());
    protection
        .deny("write", ["phone", "email"], GuardSpec::unless("serious"))
        .unwrap();

    let person = Person::new(&protection);
    person.persist().unwrap();

    assert_eq!(person.initialize_default("pm").unwrap(), json!("email"));
    assert_eq!(person.raw("email"), Some(json!("unknown@example.org")));
    assert_eq!(person.set("email", "other@example.org").unwrap_err(), illegal_write("email"));

    // Defaults computed lazily inside a permitted read behave the same.
    let fresh = Person::new(&protection);
    fresh.persist().unwrap();
    assert_eq!(fresh.get("pm").unwrap(), json!("email"));
    assert_eq!(fresh.defaults_computed.get(), 1);
    assert_eq!(fresh.get("pm").unwrap(), json!("email"));
    assert_eq!(fresh.defaults_computed.get(), 1);
}

#[test]
fn conditions_read_protected_attributes_unchecked() {
    let protection = person_protection(ProtectionConfig::default());
    protection.deny("read", "pm", ()).unwrap();
    protection
        .permit(
            "read",
            "phone",
            GuardSpec::when_fn(|person: &Person| {
                person
                    .get("pm")
                    .map(|pm| pm == json!("vip"))
                    .unwrap_or(false)
            }),
        )
        .unwrap();

    let person = Person::new(&protection);
    person.set("phone", "555-0199").unwrap();
    assert!(person.get("phone").is_err());

    person.set("pm", "vip").unwrap();
    assert_eq!(person.get("phone").unwrap(), json!("555-0199"));
    assert!(person.get("pm").is_err());
}

#[test]
fn unknown_predicates_fail_at_evaluation() {
    let protection = person_protection(ProtectionConfig::default());
    protection
        .permit("read", "lastname", GuardSpec::when("famous"))
        .unwrap();

    let person = Person::new(&protection);
    assert_eq!(
        person.get("lastname").unwrap_err(),
        ProtectError::UnknownPredicate {
            name: "famous".into()
        }
    );
}

#[test]
fn json_guards() {
    let protection = person_protection(ProtectionConfig::default());
    protection
        .permit("read", "pm", &json!({"if": "funny"}))
        .unwrap();
    protection
        .deny("write", "lastname", &json!({"unless": "serious"}))
        .unwrap();

    let person = Person::new(&protection);
    person.set("pm", "ha").unwrap();
    assert!(person.get("pm").is_err());
    assert!(person.set("lastname", "Lovelace").is_err());

    person.funny.set(true);
    person.serious.set(true);
    assert!(person.get("pm").is_ok());
    assert!(person.set("lastname", "Lovelace").is_ok());
}

#[test]
fn rejected_registrations_leave_rules_intact() {
    let protection = person_protection(ProtectionConfig::default());
    let table = protection.table();
    let pm = AttributeKey::named("pm");
    protection.permit("read", "pm", GuardSpec::when("funny")).unwrap();

    let both = json!({"if": "funny", "unless": "serious"});
    assert!(matches!(
        protection.permit("read", "pm", &both),
        Err(ProtectError::InvalidGuard(_))
    ));
    assert!(matches!(
        protection.permit("read", "pm", &json!({"when": "funny"})),
        Err(ProtectError::InvalidGuardCondition(_))
    ));
    assert!(matches!(
        protection.deny("read", ["pm", "nickname"], ()),
        Err(ProtectError::UnknownAttribute { .. })
    ));
    assert!(matches!(
        protection.deny("delete", "pm", ()),
        Err(ProtectError::InvalidPermission(_))
    ));

    assert_eq!(table.rule_count(AccessKind::Read, &pm).unwrap(), 1);
    let person = Person::new(&protection);
    person.funny.set(true);
    assert!(person.readable("pm").unwrap());
}

#[test]
fn extended_forms() {
    let protection = person_protection(ProtectionConfig::default().with_extended(true));
    let extended = protection.extended().expect("extended forms enabled");
    extended.always_deny("display", ["phone", "email"]).unwrap();
    extended.never_permit("write", "lastname").unwrap();
    extended.never_deny("read", Attributes::All).unwrap();

    let person = Person::new(&protection);
    assert!(!person.displayable("phone").unwrap());
    assert!(matches!(
        protection.interceptor().ensure_displayable(&person, "email"),
        Err(ProtectError::IllegalDisplayAccess { .. })
    ));
    assert!(person.displayable("firstname").unwrap());
    assert!(person.set("lastname", "Hopper").is_err());
    assert!(person.readable("pm").unwrap());
}

#[test]
fn wildcard_denial_covers_every_attribute() {
    let protection = person_protection(ProtectionConfig::default().with_defaults(false));
    protection
        .deny("write", Attributes::All, GuardSpec::unless("serious"))
        .unwrap();

    let person = Person::new(&protection);
    for attribute in PERSON_ATTRIBUTES {
        assert!(!person.writable(attribute).unwrap(), "{attribute}");
    }
    person.serious.set(true);
    assert!(person.set("firstname", "Ada").is_ok());
}

#[test]
fn registry_derives_subtypes_by_copy() {
    common::init_tracing();
    let registry: ProtectionRegistry<Person> = ProtectionRegistry::new();
    let people = registry
        .protect("Person", PERSON_ATTRIBUTES, ProtectionConfig::default())
        .unwrap();
    people
        .deny("write", ["phone", "email"], GuardSpec::unless("serious"))
        .unwrap();

    let employees = registry.derive("Person", "Employee", ["salary"]).unwrap();
    people.deny("read", "firstname", ()).unwrap();
    employees.deny("read", "salary", GuardSpec::unless("serious")).unwrap();

    let employee = Person::new(&employees);
    assert!(employee.readable("firstname").unwrap());
    assert!(!employee.readable("salary").unwrap());
    assert!(employee.set("phone", "555-0100").is_err());

    let person = Person::new(&people);
    assert!(!person.readable("firstname").unwrap());
    assert!(matches!(
        people.permit("read", "salary", ()),
        Err(ProtectError::UnknownAttribute { .. })
    ));

    let again = registry
        .protect("Person", ["id"], ProtectionConfig::default().with_defaults(false))
        .unwrap();
    assert!(std::sync::Arc::ptr_eq(&people, &again));
}
