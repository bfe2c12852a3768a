//! End-to-end loader tests over real files.

use std::io::Write;
use std::path::PathBuf;

use busgen::spec::{load_spec, Direction};
use busgen::SpecError;

fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

const ORDERS_YAML: &str = r#"
asyncapi: "2.0.0"
info:
  title: Order Service
  description: Order lifecycle events.
servers:
  production:
    url: nats://localhost:4222
    protocol: nats
channels:
  orders.created:
    publish:
      message:
        name: OrderCreated
        payload:
          type: object
          required: [id]
          properties:
            id:
              type: integer
  orders.shipped:
    subscribe:
      bindings:
        nats:
          streamname: orders-stream
      message:
        name: OrderShipped
        payload:
          type: object
          properties:
            id:
              type: integer
"#;

#[test]
fn yaml_document_loads_with_inverted_directions() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(&dir, "asyncapi.yaml", ORDERS_YAML);
    let spec = load_spec(&path).unwrap();

    assert_eq!(spec.title, "Order Service");
    assert_eq!(spec.server_url, "nats://localhost:4222");
    assert_eq!(spec.channels.len(), 2);

    // `publish` means the service consumes; `subscribe` means it produces.
    let created = &spec.channels[0];
    assert_eq!(created.name, "orders.created");
    assert_eq!(created.direction, Direction::Inbound);
    assert_eq!(created.messages[0].name.as_deref(), Some("OrderCreated"));

    let shipped = &spec.channels[1];
    assert_eq!(shipped.direction, Direction::Outbound);
    assert_eq!(shipped.stream.as_deref(), Some("orders-stream"));
    assert!(shipped.queue.is_none());
}

#[test]
fn json_document_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(
        &dir,
        "asyncapi.json",
        r#"{
            "info": { "title": "Pings" },
            "servers": { "p": { "url": "nats://h:4222" } },
            "channels": {
                "ping": { "publish": { "message": { "name": "Ping" } } }
            }
        }"#,
    );
    let spec = load_spec(&path).unwrap();
    assert_eq!(spec.title, "Pings");
    assert_eq!(spec.channels[0].name, "ping");
}

#[test]
fn component_refs_are_inlined_before_modeling() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(
        &dir,
        "refs.yaml",
        r##"
info:
  title: Refs
servers:
  p:
    url: nats://h:4222
channels:
  orders:
    publish:
      message:
        $ref: "#/components/messages/Order"
components:
  messages:
    Order:
      name: Order
      payload:
        $ref: "#/components/schemas/Order"
  schemas:
    Order:
      type: object
      properties:
        id:
          type: integer
"##,
    );
    let spec = load_spec(&path).unwrap();
    let message = &spec.channels[0].messages[0];
    assert_eq!(message.name.as_deref(), Some("Order"));
    let payload = message.payload.as_ref().unwrap();
    assert_eq!(payload["type"], "object");
    assert_eq!(payload["x-ref-name"], "Order");
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(&dir, "asyncapi.toml", "info = {}");
    assert!(matches!(
        load_spec(&path).unwrap_err(),
        SpecError::UnsupportedExtension { .. }
    ));
}

#[test]
fn missing_file_reports_path() {
    let err = load_spec(std::path::Path::new("does-not-exist.yaml")).unwrap_err();
    match err {
        SpecError::Io { path, .. } => assert!(path.contains("does-not-exist.yaml")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn document_without_channels_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(
        &dir,
        "empty.yaml",
        "info:\n  title: Empty\nservers:\n  p:\n    url: nats://h:4222\nchannels: {}\n",
    );
    assert!(matches!(
        load_spec(&path).unwrap_err(),
        SpecError::NoChannels
    ));
}
