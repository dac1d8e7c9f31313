//! Shared entities and wiring for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use request_unit::{
    Converters, Dispatcher, Entity, EntityType, EventTrail, IdKind, IdValue, MemoryDatabase,
    PipelineConfig, RequestAdapter, StaticMetamodel,
};

pub const ORDER: EntityType = EntityType::named("Order");
pub const CUSTOMER: EntityType = EntityType::named("Customer");
pub const PARTY: EntityType = EntityType::named("Party");
pub const PERSON: EntityType = EntityType::named("Person");
pub const EMPLOYEE: EntityType = EntityType::named("Employee");
pub const AUDIT_NOTE: EntityType = EntityType::named("AuditNote");

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: i64,
    pub total: u32,
}

impl Entity for Order {
    const ENTITY_TYPE: EntityType = ORDER;

    fn id(&self) -> IdValue {
        IdValue::Long(self.order_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub code: String,
}

impl Entity for Customer {
    const ENTITY_TYPE: EntityType = CUSTOMER;

    fn id(&self) -> IdValue {
        IdValue::Text(self.code.clone())
    }
}

/// Declares its id on `Party`, one level up.
#[derive(Debug)]
pub struct Person {
    pub id: i64,
}

impl Entity for Person {
    const ENTITY_TYPE: EntityType = PERSON;

    fn id(&self) -> IdValue {
        IdValue::Long(self.id)
    }
}

/// Declares its id on `Party`, two levels up.
#[derive(Debug)]
pub struct Employee {
    pub id: i64,
}

impl Entity for Employee {
    const ENTITY_TYPE: EntityType = EMPLOYEE;

    fn id(&self) -> IdValue {
        IdValue::Long(self.id)
    }
}

pub fn metamodel() -> StaticMetamodel {
    StaticMetamodel::builder()
        .entity(ORDER)
        .declares_id("orderId", IdKind::Long)
        .entity(CUSTOMER)
        .declares_id("code", IdKind::Text)
        .entity(PARTY)
        .declares_id("id", IdKind::Long)
        .entity(PERSON)
        .extends(PARTY)
        .entity(EMPLOYEE)
        .extends(PERSON)
        .entity(AUDIT_NOTE)
        .build()
}

pub struct Harness {
    pub db: MemoryDatabase,
    pub trail: Arc<EventTrail>,
    pub dispatcher: Dispatcher,
}

pub fn harness(config: PipelineConfig) -> Harness {
    harness_with(config, Converters::defaults())
}

pub fn harness_with(config: PipelineConfig, converters: Converters) -> Harness {
    init_tracing();
    let db = MemoryDatabase::new();
    let trail = Arc::new(EventTrail::new());
    let dispatcher = Dispatcher::from_config(
        &config,
        Arc::new(db.clone()),
        Arc::new(metamodel()),
        converters,
        trail.clone(),
    );
    Harness {
        db,
        trail,
        dispatcher,
    }
}

pub fn post(request_id: &str, fields: &[(&str, &str)]) -> RequestAdapter {
    let mut request = RequestAdapter::new(request_id.to_string());
    for (key, value) in fields {
        request.add_form_field(key.to_string(), value.to_string());
    }
    request
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
