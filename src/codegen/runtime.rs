/**
Embedded runtime libraries for the generated programs

The C backend links its output against `lib.c`/`lib.h`; the Go backend
prepends its runtime to the single generated file. Both runtimes expose one
operation per AST node so generation stays a mechanical per-node
translation: a tagged-union stack for C, a `[]interface{}` stack for Go.
*/

/// Header the generated C program includes.
pub const C_HEADER: &str = r#"#ifndef LIB_H
#define LIB_H

#define STACK_CAPACITY 1024

typedef struct Stack Stack;

typedef enum {
  TYPE_INT,
  TYPE_BOOL,
  TYPE_CHAR,
  TYPE_LIST,
  TYPE_QUOTE
} DataType;

typedef struct {
  DataType type;
  union {
    int int_value;
    int bool_value;
    char char_value;
    Stack *list_value;
    void (*quote_value)(Stack *);
  };
} Data;

struct Stack {
  int top;
  Data *elements;
};

void init_stack(Stack *stack);
Stack *new_stack(void);
void free_stack(Stack *stack);
void push(Stack *stack, Data elem);
Data pop(Stack *stack);
void push_int(Stack *stack, int value);
void push_bool(Stack *stack, int value);
void push_char(Stack *stack, char value);
void push_list(Stack *stack, Stack *value);
void push_quote(Stack *stack, void (*value)(Stack *));
void add_operation(Stack *stack);
void sub_operation(Stack *stack);
void mul_operation(Stack *stack);
void div_operation(Stack *stack);
void lt_operation(Stack *stack);
void gt_operation(Stack *stack);
void lte_operation(Stack *stack);
void gte_operation(Stack *stack);
void eq_operation(Stack *stack);
void not_operation(Stack *stack);
void cons_operation(Stack *stack);
void dup_operation(Stack *stack);
void print_operation(Stack *stack);
void eval_operation(Stack *stack);
void if_operation(Stack *stack);
void while_operation(Stack *stack);

#endif // LIB_H
"#;

/// Stack runtime the generated C program is built with.
pub const C_RUNTIME: &str = r#"#include <stdio.h>
#include <stdlib.h>
#include "lib.h"

void init_stack(Stack *stack) {
  stack->top = 0;
  stack->elements = malloc(STACK_CAPACITY * sizeof(Data));
}

Stack *new_stack(void) {
  Stack *stack = malloc(sizeof(Stack));
  init_stack(stack);
  return stack;
}

void free_stack(Stack *stack) {
  free(stack->elements);
}

void push(Stack *stack, Data elem) {
  if (stack->top >= STACK_CAPACITY) {
    printf("Stack overflow\n");
    exit(1);
  }
  stack->elements[stack->top++] = elem;
}

Data pop(Stack *stack) {
  if (stack->top <= 0) {
    printf("Stack underflow\n");
    exit(1);
  }
  return stack->elements[--stack->top];
}

void push_int(Stack *stack, int value) {
  Data data;
  data.type = TYPE_INT;
  data.int_value = value;
  push(stack, data);
}

void push_bool(Stack *stack, int value) {
  Data data;
  data.type = TYPE_BOOL;
  data.bool_value = value;
  push(stack, data);
}

void push_char(Stack *stack, char value) {
  Data data;
  data.type = TYPE_CHAR;
  data.char_value = value;
  push(stack, data);
}

void push_list(Stack *stack, Stack *value) {
  Data data;
  data.type = TYPE_LIST;
  data.list_value = value;
  push(stack, data);
}

void push_quote(Stack *stack, void (*value)(Stack *)) {
  Data data;
  data.type = TYPE_QUOTE;
  data.quote_value = value;
  push(stack, data);
}

void add_operation(Stack *stack) {
  Data b = pop(stack);
  Data a = pop(stack);
  push_int(stack, a.int_value + b.int_value);
}

void sub_operation(Stack *stack) {
  Data b = pop(stack);
  Data a = pop(stack);
  push_int(stack, a.int_value - b.int_value);
}

void mul_operation(Stack *stack) {
  Data b = pop(stack);
  Data a = pop(stack);
  push_int(stack, a.int_value * b.int_value);
}

void div_operation(Stack *stack) {
  Data b = pop(stack);
  Data a = pop(stack);
  if (b.int_value == 0) {
    printf("Division by zero\n");
    exit(1);
  }
  push_int(stack, a.int_value / b.int_value);
}

void lt_operation(Stack *stack) {
  Data b = pop(stack);
  Data a = pop(stack);
  push_bool(stack, a.int_value < b.int_value);
}

void gt_operation(Stack *stack) {
  Data b = pop(stack);
  Data a = pop(stack);
  push_bool(stack, a.int_value > b.int_value);
}

void lte_operation(Stack *stack) {
  Data b = pop(stack);
  Data a = pop(stack);
  push_bool(stack, a.int_value <= b.int_value);
}

void gte_operation(Stack *stack) {
  Data b = pop(stack);
  Data a = pop(stack);
  push_bool(stack, a.int_value >= b.int_value);
}

static int data_eq(Data a, Data b) {
  if (a.type != b.type) {
    return 0;
  }
  switch (a.type) {
  case TYPE_INT:
    return a.int_value == b.int_value;
  case TYPE_BOOL:
    return a.bool_value == b.bool_value;
  case TYPE_CHAR:
    return a.char_value == b.char_value;
  case TYPE_QUOTE:
    return a.quote_value == b.quote_value;
  case TYPE_LIST: {
    if (a.list_value->top != b.list_value->top) {
      return 0;
    }
    for (int i = 0; i < a.list_value->top; i++) {
      if (!data_eq(a.list_value->elements[i], b.list_value->elements[i])) {
        return 0;
      }
    }
    return 1;
  }
  }
  return 0;
}

void eq_operation(Stack *stack) {
  Data b = pop(stack);
  Data a = pop(stack);
  push_bool(stack, data_eq(a, b));
}

void not_operation(Stack *stack) {
  Data a = pop(stack);
  push_bool(stack, !a.bool_value);
}

void cons_operation(Stack *stack) {
  Data list = pop(stack);
  Data elem = pop(stack);
  Stack *out = new_stack();
  push(out, elem);
  for (int i = 0; i < list.list_value->top; i++) {
    push(out, list.list_value->elements[i]);
  }
  push_list(stack, out);
}

void dup_operation(Stack *stack) {
  Data a = pop(stack);
  push(stack, a);
  push(stack, a);
}

static void print_data(Data data) {
  switch (data.type) {
  case TYPE_INT:
    printf("%d", data.int_value);
    break;
  case TYPE_BOOL:
    printf("%s", data.bool_value ? "True" : "False");
    break;
  case TYPE_CHAR:
    printf("'%c'", data.char_value);
    break;
  case TYPE_LIST:
    printf("[");
    for (int i = 0; i < data.list_value->top; i++) {
      if (i > 0) {
        printf(" ");
      }
      print_data(data.list_value->elements[i]);
    }
    printf("]");
    break;
  case TYPE_QUOTE:
    printf("{quote}");
    break;
  }
}

void print_operation(Stack *stack) {
  Data a = pop(stack);
  print_data(a);
  printf("\n");
}

void eval_operation(Stack *stack) {
  Data quote = pop(stack);
  quote.quote_value(stack);
}

void if_operation(Stack *stack) {
  Data flag = pop(stack);
  Data else_quote = pop(stack);
  Data then_quote = pop(stack);
  if (flag.bool_value) {
    then_quote.quote_value(stack);
  } else {
    else_quote.quote_value(stack);
  }
}

void while_operation(Stack *stack) {
  Data body = pop(stack);
  Data cond = pop(stack);
  for (;;) {
    cond.quote_value(stack);
    Data flag = pop(stack);
    if (!flag.bool_value) {
      break;
    }
    body.quote_value(stack);
  }
}
"#;

/// Runtime prelude of the single generated Go file.
pub const GO_RUNTIME: &str = r#"package main

import "fmt"

type Stack struct {
	Elements []interface{}
}

func (s *Stack) Push(elem interface{}) {
	s.Elements = append(s.Elements, elem)
}

func (s *Stack) Pop() interface{} {
	popped := s.Elements[len(s.Elements)-1]
	s.Elements = s.Elements[:len(s.Elements)-1]
	return popped
}

func (s *Stack) Add() {
	b := s.Pop().(int)
	a := s.Pop().(int)
	s.Push(a + b)
}

func (s *Stack) Sub() {
	b := s.Pop().(int)
	a := s.Pop().(int)
	s.Push(a - b)
}

func (s *Stack) Mul() {
	b := s.Pop().(int)
	a := s.Pop().(int)
	s.Push(a * b)
}

func (s *Stack) Div() {
	b := s.Pop().(int)
	a := s.Pop().(int)
	s.Push(a / b)
}

func (s *Stack) Lt() {
	b := s.Pop().(int)
	a := s.Pop().(int)
	s.Push(a < b)
}

func (s *Stack) Gt() {
	b := s.Pop().(int)
	a := s.Pop().(int)
	s.Push(a > b)
}

func (s *Stack) Lte() {
	b := s.Pop().(int)
	a := s.Pop().(int)
	s.Push(a <= b)
}

func (s *Stack) Gte() {
	b := s.Pop().(int)
	a := s.Pop().(int)
	s.Push(a >= b)
}

func valueEqual(a, b interface{}) bool {
	if _, ok := a.(func(*Stack)); ok {
		return false
	}
	if _, ok := b.(func(*Stack)); ok {
		return false
	}
	al, aok := a.([]interface{})
	bl, bok := b.([]interface{})
	if aok && bok {
		if len(al) != len(bl) {
			return false
		}
		for i := range al {
			if !valueEqual(al[i], bl[i]) {
				return false
			}
		}
		return true
	}
	if aok || bok {
		return false
	}
	return a == b
}

func (s *Stack) Eq() {
	b := s.Pop()
	a := s.Pop()
	s.Push(valueEqual(a, b))
}

func (s *Stack) Not() {
	a := s.Pop().(bool)
	s.Push(!a)
}

func (s *Stack) Cons() {
	list := s.Pop().([]interface{})
	elem := s.Pop()
	s.Push(append([]interface{}{elem}, list...))
}

func (s *Stack) Dup() {
	a := s.Pop()
	s.Push(a)
	s.Push(a)
}

func formatValue(v interface{}) string {
	switch t := v.(type) {
	case bool:
		if t {
			return "True"
		}
		return "False"
	case int32:
		return "'" + string(t) + "'"
	case []interface{}:
		out := "["
		for i, item := range t {
			if i > 0 {
				out += " "
			}
			out += formatValue(item)
		}
		return out + "]"
	case func(*Stack):
		return "{quote}"
	default:
		return fmt.Sprintf("%v", t)
	}
}

func (s *Stack) Print() {
	fmt.Println(formatValue(s.Pop()))
}

func (s *Stack) Eval() {
	quote := s.Pop().(func(*Stack))
	quote(s)
}

func (s *Stack) If() {
	flag := s.Pop().(bool)
	elseQuote := s.Pop().(func(*Stack))
	thenQuote := s.Pop().(func(*Stack))
	if flag {
		thenQuote(s)
	} else {
		elseQuote(s)
	}
}

func (s *Stack) While() {
	body := s.Pop().(func(*Stack))
	cond := s.Pop().(func(*Stack))
	for {
		cond(s)
		if !s.Pop().(bool) {
			break
		}
		body(s)
	}
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_runtime_covers_every_operation() {
        for name in [
            "add_operation",
            "sub_operation",
            "mul_operation",
            "div_operation",
            "lt_operation",
            "gt_operation",
            "lte_operation",
            "gte_operation",
            "eq_operation",
            "not_operation",
            "cons_operation",
            "dup_operation",
            "print_operation",
            "eval_operation",
            "if_operation",
            "while_operation",
        ] {
            assert!(C_HEADER.contains(name), "header missing {}", name);
            assert!(C_RUNTIME.contains(name), "runtime missing {}", name);
        }
    }

    #[test]
    fn go_runtime_prints_like_the_interpreter() {
        assert!(GO_RUNTIME.contains(r#"return "True""#));
        assert!(GO_RUNTIME.contains("func (s *Stack) While()"));
        assert!(GO_RUNTIME.contains("package main"));
    }
}
