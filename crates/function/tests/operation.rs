mod common;

use common::*;
use function_msgraph::FunctionConfig;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn validate_users(target: &str) -> Value {
    json!({
        "apiVersion": "msgraph.fn.crossplane.io/v1alpha1",
        "kind": "Input",
        "queryType": "UserValidation",
        "users": ["user@example.com"],
        "target": target
    })
}

fn watched(status: Value, annotations: Option<Value>) -> Value {
    let mut resource = json!({
        "apiVersion": "example.org/v1",
        "kind": "XR",
        "metadata": {
            "name": "cool-xr",
            "finalizers": ["composite.apiextensions.crossplane.io"]
        },
        "spec": {"count": 2},
        "status": status
    });
    if let Some(annotations) = annotations {
        resource["metadata"]["annotations"] = annotations;
    }
    resource
}

fn fatal_only(message: &str) -> Value {
    json!({
        "meta": {"tag": "hello", "ttl": "60s"},
        "results": [fatal_result(message)]
    })
}

async fn render(req: function_msgraph::RunFunctionRequest) -> Value {
    let rsp = function(MockDirectory::returning(user_records()))
        .run_function(&req)
        .await;
    serde_json::to_value(&rsp).unwrap()
}

#[tokio::test]
async fn without_watched_resource() {
    let req = request(json!({
        "meta": {"tag": "hello"},
        "input": validate_users("context.validatedUsers"),
        "credentials": credentials(),
        "requiredResources": {}
    }));
    assert_eq!(
        render(req).await,
        fatal_only("operation: no resource to process with name ops.crossplane.io/watched-resource")
    );
}

#[tokio::test]
async fn with_no_watched_items() {
    let req = operation_request(validate_users("context.validatedUsers"), json!(null));
    assert_eq!(
        render(req).await,
        fatal_only("operation: incorrect number of resources sent to the function. expected 1, got 0")
    );
}

#[tokio::test]
async fn with_two_watched_items() {
    let req = operation_request(
        validate_users("context.validatedUsers"),
        json!([{"resource": xr()}, {"resource": xr()}]),
    );
    assert_eq!(
        render(req).await,
        fatal_only("operation: incorrect number of resources sent to the function. expected 1, got 2")
    );
}

#[tokio::test]
async fn with_empty_watched_item() {
    let req = operation_request(validate_users("context.validatedUsers"), json!([{}]));
    assert_eq!(
        render(req).await,
        fatal_only("operation: Resource.Object property in operation resource can not be empty")
    );
}

#[tokio::test]
async fn with_watched_resource_that_is_not_composite() {
    let req = operation_request(
        validate_users("status.validatedUsers"),
        json!([{"resource": {
            "apiVersion": "example.org/v1",
            "kind": "XR",
            "metadata": {"name": "cool-xr"},
            "spec": {"count": 2}
        }}]),
    );
    assert_eq!(
        render(req).await,
        fatal_only("operation: function-msgraph support only operations on composite resources")
    );
}

#[tokio::test]
async fn no_drift() {
    let req = operation_request(
        validate_users("status.validatedUsers"),
        json!([{"resource": watched(json!({"validatedUsers": user_records()}), None)}]),
    );
    assert_eq!(
        render(req).await,
        json!({
            "meta": {"tag": "hello", "ttl": "60s"},
            "desired": {"resources": {"xr": {"resource": {
                "apiVersion": "example.org/v1",
                "kind": "XR",
                "metadata": {
                    "name": "cool-xr",
                    "annotations": {
                        "function-msgraph/last-execution": FIXED_TIME,
                        "function-msgraph/last-execution-query-drift-detected": "false"
                    }
                }
            }}}},
            "results": [normal_result("UserValidation")],
            "conditions": [success_condition()]
        })
    );
}

#[tokio::test]
async fn no_drift_keeps_existing_annotations() {
    let req = operation_request(
        validate_users("status.validatedUsers"),
        json!([{"resource": watched(
            json!({"validatedUsers": user_records()}),
            Some(json!({"my-cool-annotation": "love-msgraph"}))
        )}]),
    );
    let rsp = render(req).await;
    assert_eq!(
        rsp["desired"]["resources"]["xr"]["resource"]["metadata"]["annotations"],
        json!({
            "function-msgraph/last-execution": FIXED_TIME,
            "function-msgraph/last-execution-query-drift-detected": "false",
            "my-cool-annotation": "love-msgraph"
        })
    );
}

#[tokio::test]
async fn drift_detected() {
    let mut recorded = user_records();
    recorded[0]["id"] = json!("incorrect-id");
    let req = operation_request(
        validate_users("status.validatedUsers"),
        json!([{"resource": watched(
            json!({"validatedUsers": recorded}),
            Some(json!({"my-cool-annotation": "love-msgraph"}))
        )}]),
    );
    let rsp = render(req).await;
    assert_eq!(
        rsp["desired"]["resources"]["xr"]["resource"]["metadata"]["annotations"],
        json!({
            "function-msgraph/last-execution": FIXED_TIME,
            "function-msgraph/last-execution-query-drift-detected": "true",
            "my-cool-annotation": "love-msgraph"
        })
    );
    assert_eq!(rsp["results"], json!([normal_result("UserValidation")]));
}

#[tokio::test]
async fn first_run_counts_as_drift() {
    let req = operation_request(
        validate_users("status.validatedUsers"),
        json!([{"resource": watched(json!({}), None)}]),
    );
    let rsp = render(req).await;
    assert_eq!(
        rsp["desired"]["resources"]["xr"]["resource"]["metadata"]["annotations"]
            ["function-msgraph/last-execution-query-drift-detected"],
        json!("true")
    );
}

#[tokio::test]
async fn skip_flag_is_ignored() {
    let directory = MockDirectory::returning(user_records());
    let mut input = validate_users("status.validatedUsers");
    input["skipQueryWhenTargetHasData"] = json!(true);
    let req = operation_request(
        input,
        json!([{"resource": watched(json!({"validatedUsers": user_records()}), None)}]),
    );

    let rsp = function(directory.clone()).run_function(&req).await;

    assert_eq!(directory.calls(), 1);
    assert!(rsp.conditions.iter().all(|c| c.kind != "FunctionSkip"));
}

#[tokio::test]
async fn blocked_status_write_is_fatal() {
    let req = operation_request(
        validate_users("status.result.users"),
        json!([{"resource": watched(json!({"result": "scalar"}), None)}]),
    );
    assert_eq!(
        render(req).await,
        fatal_only(
            "cannot write query result: cannot write status.result.users: result holds a string, not an object"
        )
    );
}

#[tokio::test]
async fn context_target_is_written_to_response_context() {
    let req = operation_request(
        validate_users("context.validatedUsers"),
        json!([{"resource": watched(json!({}), None)}]),
    );
    let rsp = render(req).await;
    assert_eq!(rsp["context"], json!({"validatedUsers": user_records()}));
    assert!(rsp["desired"]["resources"]["xr"].is_object());
}

#[tokio::test]
async fn annotation_prefix_comes_from_config() {
    let config = FunctionConfig::from_toml_str(r#"annotation_prefix = "msgraph.example.org""#).unwrap();
    let req = operation_request(
        validate_users("status.validatedUsers"),
        json!([{"resource": watched(json!({"validatedUsers": user_records()}), None)}]),
    );

    let rsp = function(MockDirectory::returning(user_records()))
        .with_config(config)
        .run_function(&req)
        .await;

    let xr = rsp.desired.resources["xr"].resource.clone().unwrap();
    assert_eq!(
        xr["metadata"]["annotations"],
        json!({
            "msgraph.example.org/last-execution": FIXED_TIME,
            "msgraph.example.org/last-execution-query-drift-detected": "false"
        })
    );
}
