/// Implements [`Managed`](crate::Managed) and [`Bindable`](crate::Bindable)
/// for a struct whose bound fields are [`Bound`](crate::Bound)s.
///
/// Each entry binds a field to a configuration path, optionally followed by
/// `= default`. Defaults are converted with `toml::Value::from`, so string,
/// integer, float and boolean literals all work.
///
/// ```
/// use config_value::{bindable, Bound};
///
/// #[derive(Default)]
/// pub struct Server {
///     host: Bound,
///     port: Bound,
///     banner: Bound,
///     // Not bound; ignored by the resolver.
///     requests: std::sync::atomic::AtomicU64,
/// }
///
/// bindable!(Server {
///     host: "server.host" = "0.0.0.0",
///     port: "server.port" = 8080,
///     banner: "server.banner",
/// });
/// ```
#[macro_export]
macro_rules! bindable {
    (@default) => {
        ::std::option::Option::None
    };
    (@default $default:expr) => {
        ::std::option::Option::Some($crate::Value::from($default))
    };
    ($ty:ty { $( $field:ident : $path:literal $( = $default:expr )? ),* $(,)? }) => {
        impl $crate::Managed for $ty {
            fn slot(&self, field: &str) -> ::std::option::Option<&$crate::Bound> {
                $(
                    if field == ::std::stringify!($field) {
                        return ::std::option::Option::Some(&self.$field);
                    }
                )*
                ::std::option::Option::None
            }
        }

        impl $crate::Bindable for $ty {
            fn fields() -> &'static [&'static str] {
                &[$( ::std::stringify!($field) ),*]
            }

            fn declare(
                recorder: &mut $crate::Recorder<'_, Self>,
            ) -> ::std::result::Result<(), $crate::BindingError> {
                $(
                    recorder.bind(
                        ::std::stringify!($field),
                        $path,
                        $crate::bindable!(@default $( $default )?),
                    )?;
                )*
                ::std::result::Result::Ok(())
            }
        }
    };
}
