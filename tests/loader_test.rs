//! End-to-end parameter loading through the dispatcher.

mod common;

use std::sync::{Arc, Mutex};

use common::{
    harness, harness_with, post, Customer, Employee, Order, Person, AUDIT_NOTE, CUSTOMER, EMPLOYEE,
    PERSON,
};
use request_unit::convert::ConversionError;
use request_unit::{
    ArgValue, Arguments, Converters, EntityType, Error, HandlerMethod, IdKind, IdValue, MappingError,
    MappingErrorKind, Parameter, PipelineConfig, RequestContext, Route, SupertypeWalk,
    TransactionEventKind,
};

type Seen = Arc<Mutex<Vec<String>>>;

/// Route whose handler records a description of what was bound to each slot.
fn recording_route(method: HandlerMethod, seen: &Seen) -> Route {
    let seen = seen.clone();
    Route::from_fn(method, move |ctx: &mut RequestContext| -> Result<(), Error> {
        let mut seen = seen.lock().unwrap();
        if let Some(args) = ctx.arguments() {
            for index in 0..args.len() {
                seen.push(match args.get(index) {
                    Some(ArgValue::Entity(e)) => format!("{}#{}", e.entity_type(), e.id()),
                    Some(ArgValue::Raw(raw)) => format!("raw:{raw}"),
                    None => "-".to_string(),
                });
            }
        }
        for name in ["order", "customer"] {
            if let Some(e) = ctx.attributes().get(name) {
                seen.push(format!("@{name}={}#{}", e.entity_type(), e.id()));
            }
        }
        Ok(())
    })
}

fn show_order() -> HandlerMethod {
    HandlerMethod::new("OrderController::show")
        .param(Parameter::plain("format"))
        .param(Parameter::load::<Order>("order"))
}

#[test]
fn binds_order_42_and_proceeds() {
    let h = harness(PipelineConfig::default());
    let stored = h.db.seed(Order {
        order_id: 42,
        total: 99,
    });
    let bound = Arc::new(Mutex::new(None));
    let probe = bound.clone();
    let route = Route::from_fn(show_order(), move |ctx: &mut RequestContext| -> Result<(), Error> {
        *probe.lock().unwrap() = ctx.arguments().and_then(|a| a.entity(1)).cloned();
        Ok(())
    });

    let response = h
        .dispatcher
        .dispatch(&route, &post("req-42", &[("order.orderId", "42")]))
        .unwrap();

    assert_eq!(response.status_code(), 200);
    let bound = bound.lock().unwrap().clone().unwrap();
    assert!(bound.ptr_eq(&stored));
    assert_eq!(bound.downcast_ref::<Order>().unwrap().total, 99);
}

#[test]
fn order_42_missing_answers_not_found_without_transaction() {
    let h = harness(PipelineConfig::default());
    h.db.seed(Order {
        order_id: 41,
        total: 1,
    });
    let seen = Seen::default();

    let response = h
        .dispatcher
        .dispatch(
            &recording_route(show_order(), &seen),
            &post("req-404", &[("order.orderId", "42")]),
        )
        .unwrap();

    assert_eq!(response.status_code(), 404);
    assert!(seen.lock().unwrap().is_empty());
    assert!(h.trail.is_empty());
}

#[test]
fn absent_field_answers_not_found() {
    let h = harness(PipelineConfig::default());
    let seen = Seen::default();

    let response = h
        .dispatcher
        .dispatch(
            &recording_route(show_order(), &seen),
            &post("req-absent", &[("order.id", "42")]),
        )
        .unwrap();

    assert!(response.is_not_found());
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn first_missing_parameter_stops_resolution() {
    let h = harness(PipelineConfig::default());
    h.db.seed(Customer {
        code: "ACME".to_string(),
    });
    let seen = Seen::default();
    let method = HandlerMethod::new("CustomerController::merge")
        .param(Parameter::load::<Order>("order"))
        .param(Parameter::load::<Customer>("customer"));

    let response = h
        .dispatcher
        .dispatch(
            &recording_route(method, &seen),
            &post("req-stop", &[("customer.code", "ACME")]),
        )
        .unwrap();

    assert!(response.is_not_found());
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn loads_several_parameters_of_different_id_types() {
    let h = harness(PipelineConfig::default());
    h.db.seed(Order {
        order_id: 5,
        total: 1,
    });
    h.db.seed(Customer {
        code: "ACME".to_string(),
    });
    let seen = Seen::default();
    let method = HandlerMethod::new("CustomerController::assign")
        .param(Parameter::load::<Order>("order"))
        .param(Parameter::plain("note"))
        .param(Parameter::load::<Customer>("customer"));

    h.dispatcher
        .dispatch(
            &recording_route(method, &seen),
            &post(
                "req-multi",
                &[("order.orderId", "5"), ("customer.code", "ACME")],
            ),
        )
        .unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["Order#5", "-", "Customer#ACME"]
    );
}

#[test]
fn unparsable_id_answers_not_found() {
    let h = harness(PipelineConfig::default());
    let seen = Seen::default();

    let response = h
        .dispatcher
        .dispatch(
            &recording_route(show_order(), &seen),
            &post("req-nan", &[("order.orderId", "forty-two")]),
        )
        .unwrap();

    assert_eq!(response.status_code(), 404);
}

#[test]
fn missing_converter_fails_loudly() {
    let h = harness_with(
        PipelineConfig::default(),
        Converters::defaults().without(IdKind::Long),
    );
    h.db.seed(Order {
        order_id: 42,
        total: 1,
    });
    let seen = Seen::default();

    let err = h
        .dispatcher
        .dispatch(
            &recording_route(show_order(), &seen),
            &post("req-conv", &[("order.orderId", "42")]),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Mapping(MappingError {
            kind: MappingErrorKind::MissingConverter,
            ..
        })
    ));
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn custom_converter_is_used() {
    let h = harness_with(
        PipelineConfig::default(),
        Converters::defaults().register(
            IdKind::Text,
            |raw: &str, _target: EntityType| -> Result<IdValue, ConversionError> {
                Ok(IdValue::Text(raw.to_uppercase()))
            },
        ),
    );
    h.db.seed(Customer {
        code: "ACME".to_string(),
    });
    let seen = Seen::default();
    let method =
        HandlerMethod::new("CustomerController::show").param(Parameter::load::<Customer>("customer"));

    h.dispatcher
        .dispatch(
            &recording_route(method, &seen),
            &post("req-upper", &[("customer.code", "acme")]),
        )
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["Customer#ACME"]);
}

#[test]
fn entity_without_identifier_fails_loudly() {
    let h = harness(PipelineConfig::default());
    let seen = Seen::default();
    let method = HandlerMethod::new("AuditController::show")
        .param(Parameter::load_entity("note", AUDIT_NOTE));

    let err = h
        .dispatcher
        .dispatch(&recording_route(method, &seen), &post("req-noid", &[]))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Mapping(MappingError {
            kind: MappingErrorKind::MissingIdentifierType,
            ..
        })
    ));
}

#[test]
fn identifier_declared_on_immediate_supertype() {
    let h = harness(PipelineConfig::default());
    h.db.seed(Person { id: 3 });
    let seen = Seen::default();
    let method =
        HandlerMethod::new("PersonController::show").param(Parameter::load::<Person>("person"));

    h.dispatcher
        .dispatch(
            &recording_route(method, &seen),
            &post("req-person", &[("person.id", "3")]),
        )
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![format!("{PERSON}#3")]);
}

#[test]
fn grandchild_needs_full_chain_lookup() {
    let method = || {
        HandlerMethod::new("EmployeeController::show").param(Parameter::load::<Employee>("employee"))
    };

    let single = harness(PipelineConfig::default());
    single.db.seed(Employee { id: 8 });
    let err = single
        .dispatcher
        .dispatch(
            &recording_route(method(), &Seen::default()),
            &post("req-single", &[("employee.id", "8")]),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Mapping(MappingError {
            kind: MappingErrorKind::MissingDeclaredIdentifier,
            entity_type: EMPLOYEE,
            ..
        })
    ));

    let full = harness(PipelineConfig {
        identifier_lookup: SupertypeWalk::FullChain,
        ..PipelineConfig::default()
    });
    full.db.seed(Employee { id: 8 });
    let seen = Seen::default();
    full.dispatcher
        .dispatch(
            &recording_route(method(), &seen),
            &post("req-full", &[("employee.id", "8")]),
        )
        .unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["Employee#8"]);
}

#[test]
fn flashed_arguments_keep_unflagged_slots() {
    let h = harness(PipelineConfig::default());
    h.db.seed(Order {
        order_id: 1,
        total: 1,
    });
    let seen = Seen::default();
    let mut request = post("req-flash", &[("order.orderId", "1")]);
    let mut flashed = Arguments::with_slots(2);
    flashed.set(0, ArgValue::Raw("json".to_string()));
    flashed.set(1, ArgValue::Raw("stale".to_string()));
    request.set_flashed_arguments(flashed);

    h.dispatcher
        .dispatch(&recording_route(show_order(), &seen), &request)
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["raw:json", "Order#1"]);
}

#[test]
fn attributes_are_used_without_argument_slots() {
    let h = harness(PipelineConfig {
        positional_arguments: false,
        ..PipelineConfig::default()
    });
    h.db.seed(Order {
        order_id: 2,
        total: 1,
    });
    let seen = Seen::default();

    h.dispatcher
        .dispatch(
            &recording_route(show_order(), &seen),
            &post("req-attr", &[("order.orderId", "2")]),
        )
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["@order=Order#2"]);
}

#[test]
fn loaded_entity_is_read_inside_the_transaction() {
    let h = harness(PipelineConfig::default());
    h.db.seed(Customer {
        code: "C1".to_string(),
    });
    let method = HandlerMethod::new("CustomerController::rename")
        .transactional()
        .param(Parameter::load::<Customer>("customer"));
    let route = Route::from_fn(method, |ctx: &mut RequestContext| -> Result<(), Error> {
        let current = ctx
            .arguments()
            .and_then(|a| a.entity(0))
            .and_then(|e| e.downcast_ref::<Customer>())
            .map(|c| c.code.clone());
        assert_eq!(current.as_deref(), Some("C1"));
        ctx.unit_of_work().remove(CUSTOMER, &IdValue::Text("C1".to_string()))?;
        Ok(())
    });

    h.dispatcher
        .dispatch(&route, &post("req-rename", &[("customer.code", "C1")]))
        .unwrap();

    assert_eq!(h.trail.count(TransactionEventKind::AfterCommit), 1);
    assert!(h.db.get(CUSTOMER, &IdValue::Text("C1".to_string())).is_none());
}
