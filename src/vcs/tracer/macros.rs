#[cfg(feature = "tracing")]
#[inline(always)]
pub(crate) fn __trace_record(event: crate::vcs::tracer::TraceEvent) {
    if let Ok(mut tracer) = crate::vcs::tracer::TRACER.lock() {
        tracer.record(event);
    }
}

#[macro_export]
macro_rules! trace_bank {
    ($cart:expr, $bank:expr) => {
        #[cfg(feature = "tracing")]
        {
            $crate::vcs::tracer::macros::__trace_record($crate::vcs::tracer::TraceEvent::BankSwitch {
                cart: $cart,
                bank: $bank,
            });
        }
    };
}

#[macro_export]
macro_rules! trace_write_port_read {
    ($cart:expr, $address:expr, $value:expr) => {
        #[cfg(feature = "tracing")]
        {
            $crate::vcs::tracer::macros::__trace_record(
                $crate::vcs::tracer::TraceEvent::WritePortRead {
                    cart: $cart,
                    address: $address,
                    value: $value,
                },
            );
        }
    };
}

/// Print the newest events, all of them when no count is given
#[macro_export]
macro_rules! trace_dump {
    () => {
        #[cfg(feature = "tracing")]
        {
            if let Ok(tracer) = $crate::vcs::tracer::TRACER.lock() {
                tracer.print(usize::MAX);
            }
        }
    };
    ($count:expr) => {
        #[cfg(feature = "tracing")]
        {
            if let Ok(tracer) = $crate::vcs::tracer::TRACER.lock() {
                tracer.print($count);
            }
        }
    };
}

#[macro_export]
macro_rules! trace_obj {
    ($obj:expr) => {
        #[cfg(feature = "tracing")]
        {
            if let Ok(mut tracer) = $crate::vcs::tracer::TRACER.lock() {
                tracer.log($obj);
            }
        }
    };
}
