//! Declarative macros for UPnP operation definitions
//!
//! Both macros generate the `{Op}Request` struct (with an `instance_id`
//! that defaults to 0), the operation type, its [`UPnPOperation`] impl and a
//! snake_case constructor returning an [`OperationBuilder`].
//!
//! [`UPnPOperation`]: crate::operation::UPnPOperation
//! [`OperationBuilder`]: crate::operation::OperationBuilder

/// Define an operation whose response carries no data
///
/// # Example
/// ```rust,ignore
/// define_upnp_operation! {
///     operation: PlayOperation,
///     action: "Play",
///     service: AVTransport,
///     request: {
///         speed: String,
///     },
///     arguments: {
///         "InstanceID" => instance_id,
///         "Speed" => speed,
///     },
/// }
/// ```
#[macro_export]
macro_rules! define_upnp_operation {
    (
        operation: $op_struct:ident,
        action: $action:literal,
        service: $service:ident,
        request: {
            $($field:ident: $field_type:ty),* $(,)?
        },
        arguments: {
            $($arg_name:literal => $arg_field:ident),* $(,)?
        }
        $(, validate: |$vreq:ident| $vexpr:expr)?
        $(,)?
    ) => {
        $crate::__operation_request!($op_struct { $($field: $field_type),* } $(validate: |$vreq| $vexpr)?);

        paste::paste! {
            pub struct $op_struct;

            impl $crate::operation::UPnPOperation for $op_struct {
                type Request = [<$op_struct Request>];
                type Response = ();

                const SERVICE: $crate::service::Service = $crate::service::Service::$service;
                const ACTION: &'static str = $action;

                fn build_payload(
                    request: &Self::Request,
                ) -> Result<String, $crate::operation::ValidationError> {
                    #[allow(unused_mut)]
                    let mut xml = String::new();
                    $($crate::operation::push_argument(&mut xml, $arg_name, &request.$arg_field);)*
                    let _ = request;
                    Ok(xml)
                }

                fn parse_response(
                    _xml: &xmltree::Element,
                ) -> Result<Self::Response, $crate::error::ApiError> {
                    Ok(())
                }
            }
        }
    };
}

/// Define an operation whose response fields are read from child elements
///
/// Missing or unparseable response values fall back to `Default`.
///
/// # Example
/// ```rust,ignore
/// define_operation_with_response! {
///     operation: GetVolumeOperation,
///     action: "GetVolume",
///     service: RenderingControl,
///     request: {
///         channel: String,
///     },
///     arguments: {
///         "InstanceID" => instance_id,
///         "Channel" => channel,
///     },
///     response: GetVolumeResponse {
///         current_volume: u8 => "CurrentVolume",
///     },
/// }
/// ```
#[macro_export]
macro_rules! define_operation_with_response {
    (
        operation: $op_struct:ident,
        action: $action:literal,
        service: $service:ident,
        request: {
            $($field:ident: $field_type:ty),* $(,)?
        },
        arguments: {
            $($arg_name:literal => $arg_field:ident),* $(,)?
        },
        response: $response_struct:ident {
            $($resp_field:ident: $resp_type:ty => $xml_name:literal),* $(,)?
        }
        $(, validate: |$vreq:ident| $vexpr:expr)?
        $(,)?
    ) => {
        $crate::__operation_request!($op_struct { $($field: $field_type),* } $(validate: |$vreq| $vexpr)?);

        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct $response_struct {
            $(pub $resp_field: $resp_type,)*
        }

        paste::paste! {
            pub struct $op_struct;

            impl $crate::operation::UPnPOperation for $op_struct {
                type Request = [<$op_struct Request>];
                type Response = $response_struct;

                const SERVICE: $crate::service::Service = $crate::service::Service::$service;
                const ACTION: &'static str = $action;

                fn build_payload(
                    request: &Self::Request,
                ) -> Result<String, $crate::operation::ValidationError> {
                    #[allow(unused_mut)]
                    let mut xml = String::new();
                    $($crate::operation::push_argument(&mut xml, $arg_name, &request.$arg_field);)*
                    let _ = request;
                    Ok(xml)
                }

                fn parse_response(
                    xml: &xmltree::Element,
                ) -> Result<Self::Response, $crate::error::ApiError> {
                    Ok($response_struct {
                        $($resp_field: xml
                            .get_child($xml_name)
                            .and_then(|e| e.get_text())
                            .and_then(|text| <$resp_type as $crate::operation::FromUpnpValue>::from_upnp(&text))
                            .unwrap_or_default(),)*
                    })
                }
            }
        }
    };
}

/// Request struct, its validation and the snake_case constructor
#[doc(hidden)]
#[macro_export]
macro_rules! __operation_request {
    (
        $op_struct:ident { $($field:ident: $field_type:ty),* }
        $(validate: |$vreq:ident| $vexpr:expr)?
    ) => {
        paste::paste! {
            #[derive(Clone, Debug, PartialEq)]
            pub struct [<$op_struct Request>] {
                $(pub $field: $field_type,)*
                pub instance_id: u32,
            }

            impl $crate::operation::Validate for [<$op_struct Request>] {
                $(
                    fn validate_boundary(&self) -> Result<(), $crate::operation::ValidationError> {
                        let $vreq = self;
                        $vexpr
                    }
                )?
            }

            pub fn [<$op_struct:snake>]($($field: $field_type),*) -> $crate::operation::OperationBuilder<$op_struct> {
                $crate::operation::OperationBuilder::new([<$op_struct Request>] {
                    $($field,)*
                    instance_id: 0,
                })
            }
        }
    };
}
