//! Builder for validated operations

use super::{OperationMetadata, UPnPOperation, ValidationError, ValidationLevel};
use std::marker::PhantomData;

/// Builder for constructing UPnP operations
///
/// Validation runs once, in [`OperationBuilder::build`].
pub struct OperationBuilder<Op: UPnPOperation> {
    request: Op::Request,
    validation: ValidationLevel,
    _phantom: PhantomData<Op>,
}

impl<Op: UPnPOperation> OperationBuilder<Op> {
    pub fn new(request: Op::Request) -> Self {
        Self {
            request,
            validation: ValidationLevel::default(),
            _phantom: PhantomData,
        }
    }

    /// Set the validation level for the operation
    pub fn with_validation(mut self, level: ValidationLevel) -> Self {
        self.validation = level;
        self
    }

    /// Validate the request and produce an executable operation
    pub fn build(self) -> Result<ComposableOperation<Op>, ValidationError> {
        use super::Validate;
        self.request.validate(self.validation)?;

        Ok(ComposableOperation {
            request: self.request,
            validation: self.validation,
            metadata: Op::metadata(),
            _phantom: PhantomData,
        })
    }

    /// Build without validation
    pub fn build_unchecked(self) -> ComposableOperation<Op> {
        ComposableOperation {
            request: self.request,
            validation: ValidationLevel::None,
            metadata: Op::metadata(),
            _phantom: PhantomData,
        }
    }

    pub fn validation_level(&self) -> ValidationLevel {
        self.validation
    }
}

/// A validated operation ready for execution
pub struct ComposableOperation<Op: UPnPOperation> {
    pub(crate) request: Op::Request,
    pub(crate) validation: ValidationLevel,
    pub(crate) metadata: OperationMetadata,
    _phantom: PhantomData<Op>,
}

impl<Op: UPnPOperation> ComposableOperation<Op> {
    pub fn request(&self) -> &Op::Request {
        &self.request
    }

    pub fn validation_level(&self) -> ValidationLevel {
        self.validation
    }

    pub fn metadata(&self) -> &OperationMetadata {
        &self.metadata
    }

    /// Build the SOAP payload for this operation
    pub fn build_payload(&self) -> Result<String, ValidationError> {
        Op::build_payload(&self.request)
    }

    pub fn parse_response(
        &self,
        xml: &xmltree::Element,
    ) -> Result<Op::Response, crate::error::ApiError> {
        Op::parse_response(xml)
    }
}

impl<Op: UPnPOperation> std::fmt::Debug for ComposableOperation<Op> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposableOperation")
            .field("service", &self.metadata.service)
            .field("action", &self.metadata.action)
            .field("validation", &self.validation)
            .finish()
    }
}
